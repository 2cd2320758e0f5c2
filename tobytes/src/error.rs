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

use thiserror::Error;
use tobytes_msgpack::{MsgPackReadError, MsgPackWriteError};

use crate::registry::CodecError;

/// Errors produced by the tobytes engine. Structural errors are fatal for
/// the message; unknown namespaces and type ids are only produced when the
/// decode policy leaves them as errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The underlying msgpack framing was broken.
    #[error("Invalid msgpack content: {0}")]
    Read(#[from] MsgPackReadError),

    /// Writing msgpack output failed.
    #[error("Could not write msgpack content: {0}")]
    Write(#[from] MsgPackWriteError),

    /// An extension code outside the reserved tobytes set occurred.
    #[error("Extension code {code} is not permitted in a tobytes message.")]
    DisallowedExtension { code: i8 },

    /// An intern envelope payload was neither a table nor a reference.
    #[error("An intern envelope payload was neither a table nor a reference.")]
    MalformedInternEnvelope,

    /// A namespace mapping envelope did not have the shape `[str, uint, body]`.
    #[error("A namespace mapping envelope was malformed.")]
    MalformedNamespaceEnvelope,

    /// A custom type envelope did not have the shape `[str|uint, uint, bin]`.
    #[error("A custom type envelope was malformed.")]
    MalformedCustomEnvelope,

    /// An intern table occurred while another was already active.
    #[error("Intern tables cannot be nested.")]
    NestedInternTable,

    /// An intern reference occurred with no enclosing intern table.
    #[error("An intern reference occurred with no enclosing intern table.")]
    NoInternFrame,

    /// An intern reference pointed at an entry that has not yet been decoded.
    #[error("Forward intern reference: index {index} with {available} entries available.")]
    ForwardInternRef { index: u64, available: usize },

    /// The encoder detected a cycle among the intern candidates.
    #[error("The intern candidate graph contains a cycle.")]
    CyclicInternGraph,

    /// A custom type envelope named a namespace that is not registered.
    #[error("The namespace '{namespace}' is not registered.")]
    UnknownNamespace { namespace: String },

    /// A custom type envelope used an integer namespace id with no binding in
    /// scope. This is a structural violation and is never policy mediated.
    #[error("The namespace id {id} is not bound by any enclosing mapping.")]
    UnknownNamespaceId { id: u64 },

    /// A custom type envelope named a type id that is not registered in an
    /// otherwise known namespace.
    #[error("The type id {type_id} is not registered in namespace '{namespace}'.")]
    UnknownTypeId { namespace: String, type_id: u32 },

    /// The encoder has no codec for a custom value.
    #[error("No codec is registered for type {type_id} in namespace '{namespace}'.")]
    UnregisteredType { namespace: String, type_id: u32 },

    /// A codec was registered twice for the same namespace and type id.
    #[error("A codec for type {type_id} in namespace '{namespace}' is already registered.")]
    AlreadyRegistered { namespace: String, type_id: u32 },

    /// A fallback handler was registered twice for the same namespace.
    #[error("The namespace '{namespace}' already has a fallback handler.")]
    FallbackAlreadyRegistered { namespace: String },

    /// A registered codec failed.
    #[error("The codec for type {type_id} in namespace '{namespace}' failed: {source}")]
    CodecFault {
        namespace: String,
        type_id: u32,
        #[source]
        source: CodecError,
    },
}
