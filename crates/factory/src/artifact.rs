//! Compiled contract artifacts.
//!
//! An artifact bundles the ABI and the creation bytecode of a contract. The loader
//! accepts the layouts emitted by the common toolchains:
//! - solc standard-json output: `{"abi": [..], "evm": {"bytecode": {"object": "<hex>"}}}`
//! - foundry: `{"abi": [..], "bytecode": {"object": "0x<hex>"}}`
//! - hardhat: `{"abi": [..], "bytecode": "0x<hex>"}`
//!
//! Compile scripts built on solc-js often store the ABI as a JSON-encoded string
//! instead of an array; both forms are accepted.

use std::path::Path;

use alloy_core::{json_abi::JsonAbi, primitives::Bytes};
use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Deserialize)]
struct RawArtifact {
    abi: RawAbi,
    #[serde(default)]
    evm: Option<RawEvm>,
    #[serde(default)]
    bytecode: Option<RawBytecode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAbi {
    Json(JsonAbi),
    Encoded(String),
}

#[derive(Debug, Deserialize)]
struct RawEvm {
    bytecode: BytecodeObject,
}

#[derive(Debug, Deserialize)]
struct BytecodeObject {
    object: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object(BytecodeObject),
}

/// A compiled contract: its interface and its creation bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractArtifact {
    /// Load an artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read contract artifact {}", path.display()))?;

        let artifact = Self::from_json(&content)
            .with_context(|| format!("Invalid contract artifact {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            functions = artifact.abi.functions().count(),
            "Contract artifact loaded"
        );

        Ok(artifact)
    }

    /// Parse an artifact from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawArtifact =
            serde_json::from_str(json).context("Failed to parse artifact JSON")?;

        let abi = match raw.abi {
            RawAbi::Json(abi) => abi,
            RawAbi::Encoded(encoded) => {
                serde_json::from_str(&encoded).context("Failed to parse JSON-encoded ABI")?
            }
        };

        let object = match (raw.evm, raw.bytecode) {
            (Some(evm), _) => evm.bytecode.object,
            (None, Some(RawBytecode::Object(obj))) => obj.object,
            (None, Some(RawBytecode::Hex(hex))) => hex,
            (None, None) => anyhow::bail!("Artifact has no bytecode"),
        };

        let bytecode = decode_bytecode(&object)?;

        Ok(Self { abi, bytecode })
    }

    /// The contract interface description.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// The creation bytecode.
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Hex-encoded SHA-256 of the creation bytecode.
    pub fn bytecode_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytecode);
        hex::encode(hasher.finalize())
    }
}

/// Decode creation bytecode, with or without a `0x` prefix.
fn decode_bytecode(object: &str) -> Result<Bytes> {
    let hex_str = object.trim();
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);

    if hex_str.is_empty() {
        anyhow::bail!("Artifact bytecode is empty; abstract contracts and interfaces cannot be deployed");
    }

    if hex_str.contains("__") {
        anyhow::bail!("Artifact bytecode contains unlinked library placeholders");
    }

    let bytes = hex::decode(hex_str).context("Artifact bytecode is not valid hex")?;

    Ok(Bytes::from(bytes))
}
