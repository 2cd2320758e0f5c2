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

use std::sync::Arc;

use tobytes_model::Object;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::EngineError;
use crate::policy::{DecodePolicy, EncodeOptions};
use crate::registry::Registry;

/// The tobytes encoder/decoder engine. An engine is a frozen registry
/// snapshot plus configuration; each encode or decode operation owns its
/// scoping state, so one engine can serve any number of threads.
#[derive(Clone, Default)]
pub struct Engine {
    registry: Arc<Registry>,
    policy: DecodePolicy,
    options: EncodeOptions,
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Engine {
            registry,
            policy: DecodePolicy::default(),
            options: EncodeOptions::default(),
        }
    }

    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Encode an object as a single tobytes message.
    pub fn encode(&self, object: &Object) -> Result<Vec<u8>, EngineError> {
        Encoder::new(&self.registry, &self.options).encode_message(object)
    }

    /// Decode a single tobytes message.
    pub fn decode(&self, data: &[u8]) -> Result<Object, EngineError> {
        Decoder::new(&self.registry, &self.policy).decode_message(data)
    }
}

/// Recursive engine access granted to codecs while encoding. Nested calls
/// produce independent messages with their own scoping state.
pub struct EncodeHandle<'a> {
    registry: &'a Registry,
    options: &'a EncodeOptions,
}

impl<'a> EncodeHandle<'a> {
    pub(crate) fn new(registry: &'a Registry, options: &'a EncodeOptions) -> Self {
        EncodeHandle { registry, options }
    }

    pub fn encode(&self, object: &Object) -> Result<Vec<u8>, EngineError> {
        Encoder::new(self.registry, self.options).encode_message(object)
    }
}

/// Recursive engine access granted to codecs while decoding. Nested calls
/// decode independent messages; the intern table and namespace bindings of
/// the outer message are not visible through the handle.
pub struct DecodeHandle<'a> {
    registry: &'a Registry,
    policy: &'a DecodePolicy,
}

impl<'a> DecodeHandle<'a> {
    pub(crate) fn new(registry: &'a Registry, policy: &'a DecodePolicy) -> Self {
        DecodeHandle { registry, policy }
    }

    pub fn decode(&self, data: &[u8]) -> Result<Object, EngineError> {
        Decoder::new(self.registry, self.policy).decode_message(data)
    }
}
