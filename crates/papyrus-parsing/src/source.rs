use once_cell::sync::Lazy;
use regex::Regex;

use papyrus_core::{Source, SourceName};

use crate::config::ExtractionConfig;

static DEFAULT_ARXIV_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4}\.\d{4,5})(v\d+)?").unwrap());

/// Classify the venue a paper came from.
///
/// First matching rule wins: arXiv (text mentions "arxiv" or the file name
/// carries an arXiv id), then IEEE, then ACM, then `manual`. Only arXiv
/// papers get a URL, built from the first id found in the text or, failing
/// that, in the file name.
pub fn extract_source(text: &str, file_name: &str) -> Source {
    extract_source_with_config(text, file_name, &ExtractionConfig::default())
}

/// Config-aware version of [`extract_source`].
pub(crate) fn extract_source_with_config(
    text: &str,
    file_name: &str,
    config: &ExtractionConfig,
) -> Source {
    let arxiv_id_re = config.arxiv_id_re.as_ref().unwrap_or(&*DEFAULT_ARXIV_ID_RE);
    let lower = text.to_lowercase();

    if lower.contains("arxiv") || arxiv_id_re.is_match(file_name) {
        let id = arxiv_id_re
            .find(text)
            .or_else(|| arxiv_id_re.find(file_name))
            .map(|m| m.as_str());
        tracing::debug!(arxiv_id = ?id, "classified as arXiv");
        return Source::new(
            SourceName::Arxiv,
            id.map(|id| format!("https://arxiv.org/abs/{id}")),
        );
    }

    if lower.contains("ieee") {
        return Source::new(SourceName::Ieee, None);
    }
    if lower.contains("acm") {
        return Source::new(SourceName::Acm, None);
    }
    Source::new(SourceName::Manual, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfigBuilder;

    #[test]
    fn test_arxiv_from_file_name() {
        let source = extract_source("", "2005.14165.pdf");
        assert_eq!(source.source_name, SourceName::Arxiv);
        assert_eq!(
            source.source_url.as_deref(),
            Some("https://arxiv.org/abs/2005.14165")
        );
    }

    #[test]
    fn test_arxiv_id_in_text_wins_and_keeps_version() {
        let source = extract_source("arXiv:2303.12712v5 [cs.CL]", "2005.14165.pdf");
        assert_eq!(
            source.source_url.as_deref(),
            Some("https://arxiv.org/abs/2303.12712v5")
        );
    }

    #[test]
    fn test_arxiv_mention_without_id() {
        let source = extract_source("Preprint on ArXiv", "paper.pdf");
        assert_eq!(source, Source::new(SourceName::Arxiv, None));
    }

    #[test]
    fn test_ieee_and_acm() {
        assert_eq!(
            extract_source("IEEE Transactions on Things", "x.pdf").source_name,
            SourceName::Ieee
        );
        assert_eq!(
            extract_source("Proc. ACM Conference", "x.pdf").source_name,
            SourceName::Acm
        );
        // IEEE is checked before ACM.
        assert_eq!(
            extract_source("ACM and IEEE joint", "x.pdf").source_name,
            SourceName::Ieee
        );
    }

    #[test]
    fn test_manual_fallback() {
        let source = extract_source("Nothing to see", "notes.pdf");
        assert_eq!(source, Source::default());
        assert_eq!(source.source_name.as_str(), "manual");
    }

    #[test]
    fn test_custom_id_pattern() {
        let config = ExtractionConfigBuilder::new()
            .arxiv_id_regex(r"\d{4}\.\d{5}")
            .build()
            .unwrap();
        let source = extract_source_with_config("", "1706.0376.pdf", &config);
        assert_eq!(source.source_name, SourceName::Manual);
        let source = extract_source_with_config("", "2005.14165.pdf", &config);
        assert_eq!(source.source_name, SourceName::Arxiv);
    }
}
