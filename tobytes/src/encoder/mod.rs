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

use tracing::debug;

use tobytes_model::{CustomValue, NamespaceRef, Object, RawCustom};
use tobytes_msgpack::{
    write_array_header, write_bin, write_bool, write_ext, write_f32, write_f64, write_int,
    write_map_header, write_nil, write_str, write_uint,
};

use crate::engine::EncodeHandle;
use crate::error::EngineError;
use crate::policy::{EncodeOptions, InterningMode, NamespaceIds};
use crate::registry::{Lookup, Registry};
use crate::scope::NamespaceScope;
use crate::{CUSTOM_TYPE_EXT, NAMESPACE_ID_EXT};

mod intern;

#[cfg(test)]
mod tests;

/// Encodes one [`Object`] into a tobytes message. An encoder holds the
/// scoping state of a single operation; custom type payloads are produced
/// through fresh encoders with their own state.
pub(crate) struct Encoder<'a> {
    registry: &'a Registry,
    options: &'a EncodeOptions,
    namespaces: NamespaceScope,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(registry: &'a Registry, options: &'a EncodeOptions) -> Self {
        Encoder {
            registry,
            options,
            namespaces: NamespaceScope::new(),
        }
    }

    pub(crate) fn encode_message(&mut self, object: &Object) -> Result<Vec<u8>, EngineError> {
        let bindings = self.plan_namespace_bindings(object);
        for (name, id) in &bindings {
            self.namespaces.push(name.as_str(), *id);
        }
        let body = self.encode_body(object);
        for _ in &bindings {
            self.namespaces.pop();
        }
        let mut message = body?;
        for (name, id) in bindings.iter().rev() {
            message = wrap_namespace_envelope(name, *id, &message)?;
        }
        Ok(message)
    }

    fn encode_body(&mut self, object: &Object) -> Result<Vec<u8>, EngineError> {
        if self.options.interning == InterningMode::Disabled {
            let mut buffer = Vec::new();
            self.write_object(&mut buffer, object)?;
            Ok(buffer)
        } else {
            intern::encode_with_table(self, object)
        }
    }

    fn write_object(&mut self, buffer: &mut Vec<u8>, object: &Object) -> Result<(), EngineError> {
        match object {
            Object::Sequence(items) => {
                write_array_header(buffer, items.len())?;
                for item in items {
                    self.write_object(buffer, item)?;
                }
                Ok(())
            }
            Object::Mapping(entries) => {
                write_map_header(buffer, entries.len())?;
                for (key, value) in entries {
                    self.write_object(buffer, key)?;
                    self.write_object(buffer, value)?;
                }
                Ok(())
            }
            Object::Custom(custom) => self.write_custom(buffer, custom),
            Object::Raw(raw) => write_raw(buffer, raw),
            scalar => write_scalar(buffer, scalar),
        }
    }

    fn write_custom(
        &mut self,
        buffer: &mut Vec<u8>,
        custom: &CustomValue,
    ) -> Result<(), EngineError> {
        let CustomValue {
            namespace,
            type_id,
            body,
        } = custom;
        let handle = EncodeHandle::new(self.registry, self.options);
        let data = match self.registry.lookup(namespace, *type_id) {
            Lookup::Codec(codec) => {
                codec
                    .encode(&handle, body)
                    .map_err(|source| EngineError::CodecFault {
                        namespace: namespace.clone(),
                        type_id: *type_id,
                        source,
                    })?
            }
            Lookup::Fallback(handler) => handler
                .encode(&handle, *type_id, body)
                .map_err(|source| EngineError::CodecFault {
                    namespace: namespace.clone(),
                    type_id: *type_id,
                    source,
                })?,
            Lookup::UnknownType | Lookup::UnknownNamespace => {
                return Err(EngineError::UnregisteredType {
                    namespace: namespace.clone(),
                    type_id: *type_id,
                });
            }
        };
        self.write_custom_envelope(buffer, namespace, *type_id, &data)
    }

    fn write_custom_envelope(
        &mut self,
        buffer: &mut Vec<u8>,
        namespace: &str,
        type_id: u32,
        data: &[u8],
    ) -> Result<(), EngineError> {
        let mut payload = Vec::new();
        match self.namespaces.resolve_name(namespace) {
            Some(id) => write_uint(&mut payload, id)?,
            None => write_str(&mut payload, namespace)?,
        }
        write_uint(&mut payload, type_id as u64)?;
        write_bin(&mut payload, data)?;
        write_ext(buffer, CUSTOM_TYPE_EXT, &payload)?;
        Ok(())
    }

    fn plan_namespace_bindings(&self, object: &Object) -> Vec<(String, u64)> {
        let threshold = match self.options.namespace_ids {
            NamespaceIds::Disabled => return Vec::new(),
            NamespaceIds::Threshold(threshold) => threshold.max(1),
        };
        let mut counts: Vec<(String, usize)> = Vec::new();
        count_namespaces(object, &mut counts);
        counts.retain(|(_, count)| *count >= threshold);
        counts
            .into_iter()
            .enumerate()
            .map(|(id, (name, occurrences))| {
                debug!(
                    namespace = %name,
                    id,
                    occurrences,
                    "Electing namespace id substitution."
                );
                (name, id as u64)
            })
            .collect()
    }
}

/// Counts custom type envelopes per namespace, in first appearance order.
/// Custom bodies are encoded as independent messages and are not counted.
fn count_namespaces(object: &Object, counts: &mut Vec<(String, usize)>) {
    match object {
        Object::Custom(custom) => {
            match counts.iter_mut().find(|(name, _)| *name == custom.namespace) {
                Some((_, count)) => *count += 1,
                None => counts.push((custom.namespace.clone(), 1)),
            }
        }
        Object::Sequence(items) => {
            for item in items {
                count_namespaces(item, counts);
            }
        }
        Object::Mapping(entries) => {
            for (key, value) in entries {
                count_namespaces(key, counts);
                count_namespaces(value, counts);
            }
        }
        _ => {}
    }
}

fn wrap_namespace_envelope(name: &str, id: u64, inner: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut payload = Vec::new();
    write_str(&mut payload, name)?;
    write_uint(&mut payload, id)?;
    payload.extend_from_slice(inner);
    let mut message = Vec::new();
    write_ext(&mut message, NAMESPACE_ID_EXT, &payload)?;
    Ok(message)
}

/// Re-emit an unresolved custom type exactly as it was read, including the
/// wire form of its namespace field.
fn write_raw(buffer: &mut Vec<u8>, raw: &RawCustom) -> Result<(), EngineError> {
    let mut payload = Vec::new();
    match &raw.namespace {
        NamespaceRef::Name(name) => write_str(&mut payload, name)?,
        NamespaceRef::Id(id) => write_uint(&mut payload, *id)?,
    }
    write_uint(&mut payload, raw.type_id as u64)?;
    write_bin(&mut payload, &raw.bytes)?;
    write_ext(buffer, CUSTOM_TYPE_EXT, &payload)?;
    Ok(())
}

fn write_scalar(buffer: &mut Vec<u8>, object: &Object) -> Result<(), EngineError> {
    match object {
        Object::Nil => write_nil(buffer)?,
        Object::Boolean(value) => write_bool(buffer, *value)?,
        Object::Int64(value) => write_int(buffer, *value)?,
        Object::UInt64(value) => write_uint(buffer, *value)?,
        Object::Float32(value) => write_f32(buffer, *value)?,
        Object::Float64(value) => write_f64(buffer, *value)?,
        Object::Text(value) => write_str(buffer, value)?,
        Object::Data(value) => write_bin(buffer, value)?,
        Object::Sequence(_) | Object::Mapping(_) | Object::Custom(_) | Object::Raw(_) => {
            unreachable!("not a scalar object")
        }
    }
    Ok(())
}
