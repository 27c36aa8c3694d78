//! Wire codec — tar+gzip packing of per-environment JSON documents.
//!
//! # Archive layout
//!
//! ```text
//! <envId>.json        environment metadata document
//! <envId>-data.json   {"segments": {…}, "flags": {…}}
//! checksum.sha256     hex SHA-256 of all JSON documents, filename order
//! ```
//!
//! Documents are pretty-printed from `BTreeMap`-backed types, so encoding
//! the same archive twice produces identical bytes.

use std::collections::BTreeMap;
use std::io::Read;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use flagsync_core::{Archive, EnvMetadata, Environment, Payload};

use crate::error::CodecError;

const CHECKSUM_FILE: &str = "checksum.sha256";
const DATA_SUFFIX: &str = "-data.json";

/// Serialize an archive into tar+gzip bytes.
pub fn encode(archive: &Archive) -> Result<Vec<u8>, CodecError> {
    let mut docs = documents(archive)?;
    let digest = checksum(&docs);
    docs.insert(CHECKSUM_FILE.to_string(), format!("{digest}\n").into_bytes());

    let gz = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(gz);
    for (name, contents) in &docs {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, contents.as_slice())?;
    }
    let gz = builder.into_inner()?;
    Ok(gz.finish()?)
}

/// Deserialize tar+gzip bytes back into an [`Archive`].
///
/// Pairs each `<envId>-data.json` with its `<envId>.json`; a payload without
/// metadata is fatal. Verifies `checksum.sha256` when present.
pub fn decode(bytes: &[u8]) -> Result<Archive, CodecError> {
    let gz = GzDecoder::new(bytes);
    let mut tarball = tar::Archive::new(gz);

    let mut files: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for entry in tarball.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        files.insert(name, contents);
    }

    if let Some(stored) = files.remove(CHECKSUM_FILE) {
        let expected = String::from_utf8_lossy(&stored).trim().to_string();
        let json_docs: BTreeMap<String, Vec<u8>> = files
            .iter()
            .filter(|(name, _)| name.ends_with(".json"))
            .map(|(name, contents)| (name.clone(), contents.clone()))
            .collect();
        let actual = checksum(&json_docs);
        if expected != actual {
            return Err(CodecError::ChecksumMismatch { expected, actual });
        }
    }

    let mut archive = Archive::new_empty();
    for (name, contents) in &files {
        let Some(env_id) = name.strip_suffix(DATA_SUFFIX) else {
            continue;
        };
        let metadata_name = format!("{env_id}.json");
        let Some(metadata_doc) = files.get(&metadata_name) else {
            return Err(CodecError::MissingMetadata {
                data_file: name.clone(),
            });
        };

        let metadata: EnvMetadata = parse_doc(&metadata_name, metadata_doc)?;
        let payload: Payload = parse_doc(name, contents)?;
        archive
            .environments
            .insert(metadata.env_key.clone(), Environment { metadata, payload });
    }

    Ok(archive)
}

/// The JSON documents for an archive, keyed by filename. Shared with the
/// diff renderer so review output matches published bytes.
pub(crate) fn documents(archive: &Archive) -> Result<BTreeMap<String, Vec<u8>>, CodecError> {
    let mut docs = BTreeMap::new();
    for env in archive.environments.values() {
        let metadata_name = format!("{}.json", env.metadata.env_id);
        let data_name = format!("{}{DATA_SUFFIX}", env.metadata.env_id);
        // Document names derive from the env id; a collision here would
        // silently overwrite another environment's files.
        if docs.contains_key(&metadata_name) {
            return Err(CodecError::DuplicateEnvId {
                env_id: env.metadata.env_id.clone(),
            });
        }
        docs.insert(metadata_name.clone(), render_doc(&metadata_name, &env.metadata)?);
        docs.insert(data_name.clone(), render_doc(&data_name, &env.payload)?);
    }
    Ok(docs)
}

fn render_doc<T: serde::Serialize>(name: &str, value: &T) -> Result<Vec<u8>, CodecError> {
    let mut doc = serde_json::to_vec_pretty(value).map_err(|e| CodecError::Json {
        name: name.to_string(),
        source: e,
    })?;
    doc.push(b'\n');
    Ok(doc)
}

fn parse_doc<T: serde::de::DeserializeOwned>(name: &str, doc: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(doc).map_err(|e| CodecError::Json {
        name: name.to_string(),
        source: e,
    })
}

/// Hex SHA-256 over document contents in filename order (the map is a
/// `BTreeMap`, so iteration order is the sort order).
fn checksum(docs: &BTreeMap<String, Vec<u8>>) -> String {
    let mut hasher = Sha256::new();
    for contents in docs.values() {
        hasher.update(contents);
    }
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
