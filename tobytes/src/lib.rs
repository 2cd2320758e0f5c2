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

mod decoder;
mod encoder;
mod engine;
mod error;
mod policy;
mod registry;
mod scope;

pub use engine::{DecodeHandle, EncodeHandle, Engine};
pub use error::EngineError;
pub use policy::{DecodePolicy, EncodeOptions, InternEquality, InterningMode, NamespaceIds, UnknownPolicy};
pub use registry::{CodecError, Lookup, NamespaceFallback, Registry, SharedRegistry, TypeCodec};

pub use tobytes_model::{CustomValue, NamespaceRef, Object, ObjectKind, RawCustom};

/// Extension code for intern tables and intern references.
pub const INTERN_EXT: i8 = 6;

/// Extension code for namespace-id mapping envelopes.
pub const NAMESPACE_ID_EXT: i8 = 7;

/// Extension code for custom type envelopes.
pub const CUSTOM_TYPE_EXT: i8 = 8;
