//! Beneficiary identity (name and NIT) extraction.

use std::sync::LazyLock;

use paystub_models::{Identity, PageText};
use regex::Regex;

static NIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NIT:\s*([\d.\-]+)").expect("valid regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Nome:\s*([A-Z\s]+)").expect("valid regex"));

/// Reads the beneficiary's name and NIT from the first page.
///
/// Fields that cannot be found keep the `N/D` placeholder.
#[must_use]
pub fn extract_identity(pages: &[PageText]) -> Identity {
    let mut identity = Identity::default();
    let Some(first) = pages.first() else {
        return identity;
    };

    if let Some(nit) = NIT_RE.captures(&first.text).and_then(|caps| caps.get(1)) {
        identity.nit = nit.as_str().trim().to_owned();
    }

    if let Some(name) = NAME_RE.captures(&first.text).and_then(|caps| caps.get(1)) {
        identity.name = name
            .as_str()
            .trim()
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();
    }

    log::debug!("Identity: {} / {}", identity.name, identity.nit);

    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use paystub_models::NOT_AVAILABLE;

    #[test]
    fn extracts_name_and_nit() {
        let page = PageText::new(
            1,
            "INSS\nNIT: 123.456.789-0\nNome: JOAO DA SILVA\nEndereco: Rua 1",
        );
        let identity = extract_identity(&[page]);
        assert_eq!(identity.nit, "123.456.789-0");
        assert_eq!(identity.name, "JOAO DA SILVA");
    }

    #[test]
    fn name_stops_at_first_non_uppercase() {
        let page = PageText::new(1, "Nome: MARIA SOUZA\nendereco");
        assert_eq!(extract_identity(&[page]).name, "MARIA SOUZA");
    }

    #[test]
    fn only_reads_first_page() {
        let pages = [
            PageText::new(1, "nothing here"),
            PageText::new(2, "NIT: 1.2-3\nNome: X"),
        ];
        let identity = extract_identity(&pages);
        assert_eq!(identity.name, NOT_AVAILABLE);
        assert_eq!(identity.nit, NOT_AVAILABLE);
    }

    #[test]
    fn empty_document_uses_placeholders() {
        assert_eq!(extract_identity(&[]), Identity::default());
    }
}
