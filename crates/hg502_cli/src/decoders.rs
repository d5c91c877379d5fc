//! Ways of turning save files into records for the engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use hg502_core::decoder::{CharacterSave, DecodeError, FileKind, SaveDecoder, StashFile};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Tells an external decoder which kind of file it was handed.
pub const FILE_KIND_ENV: &str = "HG502_FILE_KIND";

/// Reads files that already contain decoded records as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl SaveDecoder for JsonDecoder {
    fn decode_character(&self, path: &Path) -> Result<CharacterSave, DecodeError> {
        let bytes =
            fs::read(path).map_err(|e| DecodeError::new(format!("failed to read file: {e}")))?;
        parse_records(&bytes)
    }

    fn decode_stash(&self, _kind: FileKind, path: &Path) -> Result<StashFile, DecodeError> {
        let bytes =
            fs::read(path).map_err(|e| DecodeError::new(format!("failed to read file: {e}")))?;
        parse_records(&bytes)
    }
}

/// Runs `<program> [args...] <file>` and reads the JSON record from stdout.
#[derive(Debug, Clone)]
pub struct CommandDecoder {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandDecoder {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run(&self, kind: FileKind, path: &Path) -> Result<Vec<u8>, DecodeError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .env(FILE_KIND_ENV, kind.as_str())
            .output()
            .map_err(|e| {
                DecodeError::new(format!(
                    "failed to run decoder {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(DecodeError::new(if detail.is_empty() {
                format!("decoder exited with {}", output.status)
            } else {
                detail.to_string()
            }));
        }

        debug!(
            decoder = %self.program.display(),
            path = %path.display(),
            %kind,
            bytes = output.stdout.len(),
            "external decoder finished"
        );
        Ok(output.stdout)
    }
}

impl SaveDecoder for CommandDecoder {
    fn decode_character(&self, path: &Path) -> Result<CharacterSave, DecodeError> {
        parse_records(&self.run(FileKind::Character, path)?)
    }

    fn decode_stash(&self, kind: FileKind, path: &Path) -> Result<StashFile, DecodeError> {
        parse_records(&self.run(kind, path)?)
    }
}

fn parse_records<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError::new(format!("invalid record JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use hg502_core::decoder::{FileKind, SaveDecoder};

    use super::{CommandDecoder, JsonDecoder};

    const CHARACTER_JSON: &str = r#"{
        "items": [{"name": "Civerb's Ward", "set_id": 0}],
        "merc_items": [{"name": "Socketed Helm", "socketed_items": [{"name": "Rainbow Facet", "unique_id": 396}]}]
    }"#;

    #[test]
    fn json_decoder_reads_character_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Sorc.d2s");
        fs::write(&path, CHARACTER_JSON).expect("failed to write fixture");

        let save = JsonDecoder
            .decode_character(&path)
            .expect("character should decode");
        assert_eq!(save.items[0].set_id, Some(0));
        assert!(save.corpse_items.is_empty());
        assert_eq!(save.merc_items[0].socketed_items[0].unique_id, Some(396));
    }

    #[test]
    fn json_decoder_reports_invalid_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Sorc.d2x");
        fs::write(&path, b"\x55\xAA\x55\xAA").expect("failed to write fixture");

        let err = JsonDecoder
            .decode_stash(FileKind::PersonalStash, &path)
            .expect_err("binary data is not json");
        assert!(err.message.starts_with("invalid record JSON"));
    }

    #[test]
    fn missing_decoder_program_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Sorc.d2s");
        fs::write(&path, CHARACTER_JSON).expect("failed to write fixture");

        let decoder = CommandDecoder::new(dir.path().join("no-such-decoder"), Vec::new());
        let err = decoder
            .decode_character(&path)
            .expect_err("missing program should fail");
        assert!(err.message.contains("failed to run decoder"));
    }

    #[cfg(unix)]
    #[test]
    fn command_decoder_reads_stdout() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Sorc.d2s");
        fs::write(&path, CHARACTER_JSON).expect("failed to write fixture");

        let save = CommandDecoder::new("cat", Vec::new())
            .decode_character(&path)
            .expect("cat should pass the json through");
        assert_eq!(save.items[0].name, "Civerb's Ward");
    }

    #[cfg(unix)]
    #[test]
    fn command_decoder_failure_uses_stderr() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.sss");

        let err = CommandDecoder::new("cat", Vec::new())
            .decode_stash(FileKind::SharedStash, &path)
            .expect_err("cat on a missing file fails");
        assert!(err.message.contains("missing.sss"));
    }
}
