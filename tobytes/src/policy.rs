// Copyright 2015-2023 Swim Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tobytes_model::{Object, RawCustom};

use crate::registry::CodecError;

/// What the decoder does with a custom type it cannot resolve. Unbound
/// namespace ids are structural violations and are not covered by any
/// policy.
#[derive(Clone, Default)]
pub enum UnknownPolicy {
    /// Fail the decode.
    #[default]
    Error,
    /// Produce an opaque [`Object::Raw`] value that re-encodes to the
    /// original bytes.
    AsRaw,
    /// Delegate to a handler which receives the raw envelope contents.
    Handler(Arc<dyn Fn(RawCustom) -> Result<Object, CodecError> + Send + Sync>),
}

impl Debug for UnknownPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownPolicy::Error => f.write_str("Error"),
            UnknownPolicy::AsRaw => f.write_str("AsRaw"),
            UnknownPolicy::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Decoder behavior for custom types that do not resolve against the
/// registry.
#[derive(Clone, Debug, Default)]
pub struct DecodePolicy {
    pub on_unknown_namespace: UnknownPolicy,
    pub on_unknown_type: UnknownPolicy,
}

impl DecodePolicy {
    pub fn new() -> Self {
        DecodePolicy::default()
    }

    /// Treat every unresolved custom type as an opaque raw value.
    pub fn as_raw() -> Self {
        DecodePolicy {
            on_unknown_namespace: UnknownPolicy::AsRaw,
            on_unknown_type: UnknownPolicy::AsRaw,
        }
    }
}

/// The equality under which the encoder considers two sub-trees to be the
/// same intern candidate.
#[derive(Clone, Default)]
pub enum InternEquality {
    /// Structural equality of the canonical msgpack bytes of the sub-tree.
    #[default]
    CanonicalBytes,
    /// A user supplied predicate.
    Predicate(Arc<dyn Fn(&Object, &Object) -> bool + Send + Sync>),
}

impl Debug for InternEquality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InternEquality::CanonicalBytes => f.write_str("CanonicalBytes"),
            InternEquality::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Whether and how the encoder builds intern tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterningMode {
    /// Never build a table.
    #[default]
    Disabled,
    /// Intern every eligible sub-tree that occurs more than once.
    AllRepeats,
    /// Intern a repeated sub-tree only when the bytes saved by referencing
    /// it outweigh the cost of the table entry.
    CostModel,
}

/// Whether the encoder substitutes integer ids for namespace strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NamespaceIds {
    #[default]
    Disabled,
    /// Bind an id for every namespace occurring at least this many times in
    /// the message.
    Threshold(usize),
}

/// Caller configuration for the encoder.
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    pub interning: InterningMode,
    pub intern_equality: InternEquality,
    pub namespace_ids: NamespaceIds,
}

impl EncodeOptions {
    pub fn new() -> Self {
        EncodeOptions::default()
    }

    pub fn with_interning(mut self, mode: InterningMode) -> Self {
        self.interning = mode;
        self
    }

    pub fn with_intern_equality(mut self, equality: InternEquality) -> Self {
        self.intern_equality = equality;
        self
    }

    pub fn with_namespace_ids(mut self, threshold: usize) -> Self {
        self.namespace_ids = NamespaceIds::Threshold(threshold);
        self
    }
}
