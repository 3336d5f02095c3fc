//! Rebuilding expressions from their encoded form.

use tessera_core::{ExprArena, ExprRef, NodeDescriptor, OperatorRegistry};
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::format::{parse_fingerprint, EncodedExpr, EncodedNode, FORMAT_VERSION};
use crate::values::ValueDecoderRegistry;

/// Rebuilds encoded expressions against a pair of registries.
///
/// Operators are resolved by name and must match the recorded fingerprint,
/// so an expression encoded against one operator version never silently
/// decodes against another. Every rebuilt node is checked against its
/// recorded fingerprint.
#[derive(Clone, Copy, Debug)]
pub struct Decoder<'a> {
    /// Operator resolution.
    pub operators: &'a OperatorRegistry,
    /// Literal payload decoding.
    pub values: &'a ValueDecoderRegistry,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder.
    #[must_use]
    pub fn new(operators: &'a OperatorRegistry, values: &'a ValueDecoderRegistry) -> Self {
        Self { operators, values }
    }

    /// Interns the encoded graph in `arena` and returns its root.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Lookup`] for an unregistered operator name or value
    ///   type
    /// - [`CodecError::FingerprintMismatch`] when no registered version of an
    ///   operator has the recorded fingerprint, or a rebuilt node differs
    ///   from the recorded one
    /// - [`CodecError::Malformed`] for structural problems (version, indices,
    ///   payloads)
    /// - [`CodecError::Expr`] when re-interning a node fails
    pub fn decode(&self, arena: &ExprArena, encoded: &EncodedExpr) -> Result<ExprRef> {
        if encoded.format_version != FORMAT_VERSION {
            return Err(CodecError::Malformed(format!(
                "unsupported format version {}",
                encoded.format_version
            )));
        }
        if encoded.root >= encoded.nodes.len() {
            return Err(CodecError::Malformed(format!(
                "root index {} out of range for {} nodes",
                encoded.root,
                encoded.nodes.len()
            )));
        }

        let mut built: Vec<ExprRef> = Vec::with_capacity(encoded.nodes.len());
        for (index, entry) in encoded.nodes.iter().enumerate() {
            let node = self.decode_node(arena, entry, &built)?;
            let recorded = parse_fingerprint(entry.fingerprint_text())?;
            if node.fingerprint() != recorded {
                return Err(CodecError::FingerprintMismatch {
                    subject: format!("node {index}"),
                    expected: recorded,
                    found: node.fingerprint(),
                });
            }
            built.push(node);
        }

        debug!(nodes = built.len(), "decoded expression");
        Ok(built.swap_remove(encoded.root))
    }

    fn decode_node(&self, arena: &ExprArena, entry: &EncodedNode, built: &[ExprRef]) -> Result<ExprRef> {
        match entry {
            EncodedNode::Literal { qtype, payload, .. } => {
                let decoder = self
                    .values
                    .lookup(qtype)
                    .ok_or_else(|| CodecError::Lookup(format!("no value decoder for type '{qtype}'")))?;
                let bytes = hex::decode(payload)
                    .map_err(|err| CodecError::Malformed(format!("literal payload: {err}")))?;
                let value = decoder
                    .decode(&bytes)
                    .map_err(|message| CodecError::Malformed(format!("{qtype} payload: {message}")))?;
                if value.qtype().name() != qtype.as_str() {
                    return Err(CodecError::Malformed(format!(
                        "decoder for {qtype} produced a {} value",
                        value.qtype()
                    )));
                }
                Ok(arena.literal(value))
            }
            EncodedNode::Leaf { key, .. } => Ok(arena.leaf(key.as_str())),
            EncodedNode::Placeholder { key, .. } => Ok(arena.placeholder(key.as_str())),
            EncodedNode::Operator {
                name,
                operator_fingerprint,
                deps,
                ..
            } => {
                let expected = parse_fingerprint(operator_fingerprint)?;
                let op = match self.operators.find_version(name, expected) {
                    Some(op) => op,
                    None => {
                        let latest = self
                            .operators
                            .lookup(name)
                            .ok_or_else(|| CodecError::Lookup(format!("operator '{name}' is not registered")))?;
                        return Err(CodecError::FingerprintMismatch {
                            subject: format!("operator '{name}'"),
                            expected,
                            found: latest.fingerprint(),
                        });
                    }
                };
                let deps = deps
                    .iter()
                    .map(|&dep| {
                        built.get(dep).cloned().ok_or_else(|| {
                            CodecError::Malformed(format!(
                                "dependency index {dep} does not precede node {}",
                                built.len()
                            ))
                        })
                    })
                    .collect::<Result<_>>()?;
                Ok(arena.intern(NodeDescriptor::Operator { op, deps })?)
            }
        }
    }
}
