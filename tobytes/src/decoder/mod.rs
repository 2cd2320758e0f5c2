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

use either::Either;

use tobytes_model::{CustomValue, NamespaceRef, Object, RawCustom};
use tobytes_msgpack::{read_token, ExtToken, MsgPackReadError, Token};

use crate::engine::DecodeHandle;
use crate::error::EngineError;
use crate::policy::{DecodePolicy, UnknownPolicy};
use crate::registry::{Lookup, Registry};
use crate::scope::{InternFrame, NamespaceScope};
use crate::{CUSTOM_TYPE_EXT, INTERN_EXT, NAMESPACE_ID_EXT};


/// Decodes one tobytes message into an [`Object`]. A decoder holds the
/// scoping state of a single operation; custom type payloads are decoded
/// through fresh decoders and never observe the state of this one.
pub(crate) struct Decoder<'a> {
    registry: &'a Registry,
    policy: &'a DecodePolicy,
    intern: Option<InternFrame>,
    namespaces: NamespaceScope,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(registry: &'a Registry, policy: &'a DecodePolicy) -> Self {
        Decoder {
            registry,
            policy,
            intern: None,
            namespaces: NamespaceScope::new(),
        }
    }

    /// Decode a complete message. The input must contain exactly one value.
    pub(crate) fn decode_message(&mut self, data: &[u8]) -> Result<Object, EngineError> {
        let mut input = data;
        let value = self.decode_value(&mut input)?;
        if input.is_empty() {
            Ok(value)
        } else {
            Err(MsgPackReadError::UnconsumedData.into())
        }
    }

    fn decode_value(&mut self, input: &mut &[u8]) -> Result<Object, EngineError> {
        match read_token(input)? {
            Token::Nil => Ok(Object::Nil),
            Token::Bool(value) => Ok(Object::Boolean(value)),
            Token::Int(value) => Ok(Object::Int64(value)),
            Token::UInt(value) => Ok(Object::UInt64(value)),
            Token::F32(value) => Ok(Object::Float32(value)),
            Token::F64(value) => Ok(Object::Float64(value)),
            Token::Str(value) => Ok(Object::Text(value)),
            Token::Bin(value) => Ok(Object::Data(value)),
            Token::ArrayHeader(len) => {
                let mut items = Vec::new();
                for _ in 0..len {
                    items.push(self.decode_value(input)?);
                }
                Ok(Object::Sequence(items))
            }
            Token::MapHeader(len) => {
                let mut entries = Vec::new();
                for _ in 0..len {
                    let key = self.decode_value(input)?;
                    let value = self.decode_value(input)?;
                    entries.push((key, value));
                }
                Ok(Object::Mapping(entries))
            }
            Token::Ext(ext) => self.decode_extension(ext),
        }
    }

    fn decode_extension(&mut self, ext: ExtToken) -> Result<Object, EngineError> {
        let ExtToken { code, payload } = ext;
        match code {
            INTERN_EXT => self.decode_intern_envelope(&payload),
            NAMESPACE_ID_EXT => self.decode_namespace_envelope(&payload),
            CUSTOM_TYPE_EXT => self.decode_custom_envelope(&payload),
            code => Err(EngineError::DisallowedExtension { code }),
        }
    }

    /// An intern envelope is a table when its payload starts with an array
    /// and a back-reference when it starts with a uint.
    fn decode_intern_envelope(&mut self, payload: &[u8]) -> Result<Object, EngineError> {
        let mut input = payload;
        match intern_envelope_head(&mut input)? {
            Either::Left(entries) => {
                if self.intern.is_some() {
                    return Err(EngineError::NestedInternTable);
                }
                self.intern = Some(InternFrame::new());
                let result = self.decode_table_contents(&mut input, entries);
                self.intern = None;
                result
            }
            Either::Right(index) => self.resolve_reference(index),
        }
    }

    fn decode_table_contents(
        &mut self,
        input: &mut &[u8],
        entries: u32,
    ) -> Result<Object, EngineError> {
        for _ in 0..entries {
            let entry = self.decode_value(input)?;
            if let Some(frame) = self.intern.as_mut() {
                frame.push(entry);
            }
        }
        let body = self.decode_value(input)?;
        if input.is_empty() {
            Ok(body)
        } else {
            Err(MsgPackReadError::UnconsumedData.into())
        }
    }

    fn resolve_reference(&self, index: u64) -> Result<Object, EngineError> {
        let frame = self.intern.as_ref().ok_or(EngineError::NoInternFrame)?;
        frame
            .get(index)
            .cloned()
            .ok_or(EngineError::ForwardInternRef {
                index,
                available: frame.len(),
            })
    }

    fn decode_namespace_envelope(&mut self, payload: &[u8]) -> Result<Object, EngineError> {
        let mut input = payload;
        let name = match read_token(&mut input)? {
            Token::Str(name) => name,
            _ => return Err(EngineError::MalformedNamespaceEnvelope),
        };
        let id = match read_token(&mut input)? {
            Token::UInt(id) => id,
            _ => return Err(EngineError::MalformedNamespaceEnvelope),
        };
        self.namespaces.push(name, id);
        let result = self.decode_value(&mut input).and_then(|body| {
            if input.is_empty() {
                Ok(body)
            } else {
                Err(MsgPackReadError::UnconsumedData.into())
            }
        });
        self.namespaces.pop();
        result
    }

    fn decode_custom_envelope(&mut self, payload: &[u8]) -> Result<Object, EngineError> {
        let mut input = payload;
        let wire_ref = match read_token(&mut input)? {
            Token::Str(name) => NamespaceRef::Name(name),
            Token::UInt(id) => NamespaceRef::Id(id),
            _ => return Err(EngineError::MalformedCustomEnvelope),
        };
        let type_id = match read_token(&mut input)? {
            Token::UInt(id) => {
                u32::try_from(id).map_err(|_| EngineError::MalformedCustomEnvelope)?
            }
            _ => return Err(EngineError::MalformedCustomEnvelope),
        };
        let data = match read_token(&mut input)? {
            Token::Bin(data) => data,
            _ => return Err(EngineError::MalformedCustomEnvelope),
        };
        if !input.is_empty() {
            return Err(MsgPackReadError::UnconsumedData.into());
        }

        let namespace = match &wire_ref {
            NamespaceRef::Name(name) => name.clone(),
            NamespaceRef::Id(id) => self
                .namespaces
                .resolve_id(*id)
                .ok_or(EngineError::UnknownNamespaceId { id: *id })?
                .to_owned(),
        };

        let handle = DecodeHandle::new(self.registry, self.policy);
        match self.registry.lookup(&namespace, type_id) {
            Lookup::Codec(codec) => {
                let result = codec.decode(&handle, &data);
                finish_custom(namespace, type_id, result)
            }
            Lookup::Fallback(handler) => {
                let result = handler.decode(&handle, type_id, &data);
                finish_custom(namespace, type_id, result)
            }
            Lookup::UnknownType => apply_policy(
                &self.policy.on_unknown_type,
                EngineError::UnknownTypeId {
                    namespace: namespace.clone(),
                    type_id,
                },
                namespace,
                wire_ref,
                type_id,
                data,
            ),
            Lookup::UnknownNamespace => apply_policy(
                &self.policy.on_unknown_namespace,
                EngineError::UnknownNamespace {
                    namespace: namespace.clone(),
                },
                namespace,
                wire_ref,
                type_id,
                data,
            ),
        }
    }
}

fn finish_custom(
    namespace: String,
    type_id: u32,
    result: Result<Object, crate::registry::CodecError>,
) -> Result<Object, EngineError> {
    match result {
        Ok(body) => Ok(Object::Custom(CustomValue::new(namespace, type_id, body))),
        Err(source) => Err(EngineError::CodecFault {
            namespace,
            type_id,
            source,
        }),
    }
}

fn intern_envelope_head(input: &mut &[u8]) -> Result<Either<u32, u64>, EngineError> {
    match read_token(input)? {
        Token::ArrayHeader(entries) => Ok(Either::Left(entries)),
        Token::UInt(index) => Ok(Either::Right(index)),
        _ => Err(EngineError::MalformedInternEnvelope),
    }
}

fn apply_policy(
    policy: &UnknownPolicy,
    error: EngineError,
    namespace: String,
    wire_ref: NamespaceRef,
    type_id: u32,
    data: Vec<u8>,
) -> Result<Object, EngineError> {
    match policy {
        UnknownPolicy::Error => Err(error),
        UnknownPolicy::AsRaw => Ok(Object::Raw(RawCustom {
            namespace: wire_ref,
            type_id,
            bytes: data,
        })),
        UnknownPolicy::Handler(handler) => handler.as_ref()(RawCustom {
            namespace: wire_ref,
            type_id,
            bytes: data,
        })
        .map_err(|source| EngineError::CodecFault {
            namespace,
            type_id,
            source,
        }),
    }
}
