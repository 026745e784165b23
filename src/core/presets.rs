//! Built-in model sets for English to Chinese translation.

use crate::core::manifest::{ArchiveSpec, FileSpec, ModelSet};

/// Browser User-Agent expected by the ModelScope file server.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

const CSANMT_BASE: &str =
    "https://modelscope.cn/models/damo/nlp_csanmt_translation_en2zh/resolve/master";

pub fn builtin_sets() -> Vec<ModelSet> {
    vec![opus_mt_en_zh(), csanmt_en_zh(), argos_translate()]
}

/// Opus-MT ONNX export from the Hugging Face hub.
pub fn opus_mt_en_zh() -> ModelSet {
    ModelSet {
        name: "opus-mt-en-zh".to_string(),
        dir: "opus-mt-en-zh".to_string(),
        description: Some("Opus-MT English to Chinese (Hugging Face)".to_string()),
        base_url: Some("https://huggingface.co/Helsinki-NLP/opus-mt-en-zh/resolve/main".to_string()),
        mirror_url: Some("https://hf-mirror.com/Helsinki-NLP/opus-mt-en-zh/resolve/main".to_string()),
        manual_url: Some("https://huggingface.co/Helsinki-NLP/opus-mt-en-zh/tree/main".to_string()),
        user_agent: None,
        timeout_secs: None,
        accept_invalid_certs: None,
        archive: None,
        files: vec![
            hinted("model.onnx", 90.0),
            hinted("vocab.json", 1.0),
            hinted("config.json", 0.001),
            hinted("source.spm", 1.0),
            hinted("target.spm", 1.0),
        ],
    }
}

/// CSANMT TensorFlow graph from the ModelScope community hub.
pub fn csanmt_en_zh() -> ModelSet {
    let files = ["tf_graph.pb", "spiece.model", "vocab.txt", "configuration.json"]
        .iter()
        .map(|name| FileSpec {
            name: name.to_string(),
            url: Some(format!("{CSANMT_BASE}/{name}")),
            size_hint_mb: None,
            sha256: None,
        })
        .collect();

    ModelSet {
        name: "csanmt-en-zh".to_string(),
        dir: "csanmt-en-zh".to_string(),
        description: Some("CSANMT English to Chinese (ModelScope)".to_string()),
        base_url: None,
        mirror_url: None,
        manual_url: Some(
            "https://modelscope.cn/models/damo/nlp_csanmt_translation_en2zh/files".to_string(),
        ),
        user_agent: Some(BROWSER_USER_AGENT.to_string()),
        timeout_secs: Some(300),
        accept_invalid_certs: None,
        archive: None,
        files,
    }
}

/// Argos Translate package, a zip unpacked in place.
pub fn argos_translate() -> ModelSet {
    ModelSet {
        name: "argos-translate".to_string(),
        dir: "argos-translate".to_string(),
        description: Some("Argos Translate English to Chinese package".to_string()),
        base_url: None,
        mirror_url: None,
        manual_url: None,
        user_agent: None,
        timeout_secs: None,
        accept_invalid_certs: None,
        archive: Some(ArchiveSpec {
            url: "https://argosopentech.nyc3.digitaloceanspaces.com/argos-translate/packages/v1/translate-en_zh-1_9.zip".to_string(),
            marker: "model".to_string(),
            strip_top_level: false,
        }),
        files: Vec::new(),
    }
}

fn hinted(name: &str, size_mb: f64) -> FileSpec {
    FileSpec {
        name: name.to_string(),
        url: None,
        size_hint_mb: Some(size_mb),
        sha256: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::SetKind;

    #[test]
    fn test_builtin_sets_are_valid() {
        for set in builtin_sets() {
            assert!(set.validate().is_ok(), "{} failed validation", set.name);
        }
    }

    #[test]
    fn test_builtin_kinds() {
        let kinds: Vec<SetKind> = builtin_sets().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![SetKind::Files, SetKind::Files, SetKind::Archive]);
    }

    #[test]
    fn test_opus_manifest_order() {
        let names: Vec<String> = opus_mt_en_zh()
            .manifest(false)
            .unwrap()
            .into_iter()
            .map(|e| e.file_name)
            .collect();
        assert_eq!(
            names,
            vec!["model.onnx", "vocab.json", "config.json", "source.spm", "target.spm"]
        );
    }

    #[test]
    fn test_csanmt_urls() {
        let manifest = csanmt_en_zh().manifest(false).unwrap();
        assert_eq!(
            manifest[0].url,
            "https://modelscope.cn/models/damo/nlp_csanmt_translation_en2zh/resolve/master/tf_graph.pb"
        );
        assert_eq!(manifest.len(), 4);
    }
}
