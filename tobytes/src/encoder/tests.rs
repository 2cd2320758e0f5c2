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

use crate::engine::{DecodeHandle, EncodeHandle, Engine};
use crate::error::EngineError;
use crate::policy::{EncodeOptions, InternEquality, InterningMode};
use crate::registry::{CodecError, Registry, TypeCodec};
use tobytes_model::{CustomValue, NamespaceRef, Object, RawCustom};

struct NestedMessageCodec;

impl TypeCodec for NestedMessageCodec {
    fn encode(&self, engine: &EncodeHandle<'_>, body: &Object) -> Result<Vec<u8>, CodecError> {
        Ok(engine.encode(body)?)
    }

    fn decode(&self, engine: &DecodeHandle<'_>, data: &[u8]) -> Result<Object, CodecError> {
        Ok(engine.decode(data)?)
    }
}

fn plain_engine() -> Engine {
    Engine::new(Arc::new(Registry::new()))
}

fn interning_engine(mode: InterningMode) -> Engine {
    plain_engine().with_options(EncodeOptions::new().with_interning(mode))
}

#[test]
fn scalars_encode_minimally() {
    let engine = plain_engine();
    assert_eq!(engine.encode(&Object::from(42u64)).expect("encode"), vec![0x2a]);
    assert_eq!(engine.encode(&Object::from(42i64)).expect("encode"), vec![0x2a]);
    assert_eq!(engine.encode(&Object::Nil).expect("encode"), vec![0xc0]);
    assert_eq!(
        engine.encode(&Object::text("hello")).expect("encode"),
        vec![0xa5, 0x68, 0x65, 0x6c, 0x6c, 0x6f]
    );
    assert_eq!(
        engine.encode(&Object::from(-33i64)).expect("encode"),
        vec![0xd0, 223]
    );
}

#[test]
fn containers_encode_through_adapter() {
    let engine = plain_engine();
    let object = Object::mapping(vec![(
        Object::text("a"),
        Object::sequence(vec![Object::from(1u64), Object::from(2u64)]),
    )]);
    assert_eq!(
        engine.encode(&object).expect("encode"),
        vec![0x81, 0xa1, 0x61, 0x92, 0x01, 0x02]
    );
}

#[test]
fn repeated_text_interned() {
    let engine = interning_engine(InterningMode::AllRepeats);
    let object = Object::sequence(vec![Object::text("hi"), Object::text("hi")]);

    let encoded = engine.encode(&object).expect("encode");
    let expected = vec![
        0xc7, 0x0b, 0x06, // ext 6, 11 byte payload
        0x91, 0xa2, 0x68, 0x69, // entries: ["hi"]
        0x92, 0xd4, 0x06, 0x00, 0xd4, 0x06, 0x00, // body: [ref 0, ref 0]
    ];
    assert_eq!(encoded, expected);

    assert_eq!(engine.decode(&encoded).expect("decode"), object);
}

#[test]
fn interning_disabled_by_default() {
    let engine = plain_engine();
    let object = Object::sequence(vec![Object::text("hi"), Object::text("hi")]);
    assert_eq!(
        engine.encode(&object).expect("encode"),
        vec![0x92, 0xa2, 0x68, 0x69, 0xa2, 0x68, 0x69]
    );
}

#[test]
fn cost_model_skips_cheap_repeats() {
    let engine = interning_engine(InterningMode::CostModel);
    let object = Object::sequence(vec![Object::text("hi"), Object::text("hi")]);
    assert_eq!(
        engine.encode(&object).expect("encode"),
        vec![0x92, 0xa2, 0x68, 0x69, 0xa2, 0x68, 0x69]
    );
}

#[test]
fn cost_model_interns_expensive_repeats() {
    let engine = interning_engine(InterningMode::CostModel);
    let text = "a".repeat(40);
    let object = Object::sequence(vec![Object::text(&text), Object::text(&text)]);

    let encoded = engine.encode(&object).expect("encode");
    let plain_len = plain_engine().encode(&object).expect("encode").len();
    assert!(encoded.len() < plain_len);
    assert_eq!(engine.decode(&encoded).expect("decode"), object);
}

#[test]
fn nested_candidates_reference_earlier_entries() {
    let engine = interning_engine(InterningMode::AllRepeats);
    let pair = Object::sequence(vec![Object::text("hi"), Object::text("x")]);
    let object = Object::sequence(vec![pair.clone(), pair.clone(), Object::text("hi")]);

    let encoded = engine.encode(&object).expect("encode");
    assert_eq!(engine.decode(&encoded).expect("decode"), object);
}

#[test]
fn predicate_equality_merges_classes() {
    let equality = InternEquality::Predicate(Arc::new(|a: &Object, b: &Object| {
        match (a, b) {
            (Object::Text(x), Object::Text(y)) => x.eq_ignore_ascii_case(y),
            _ => false,
        }
    }));
    let engine = plain_engine().with_options(
        EncodeOptions::new()
            .with_interning(InterningMode::AllRepeats)
            .with_intern_equality(equality),
    );

    let object = Object::sequence(vec![
        Object::text("HI"),
        Object::text("hi"),
        Object::text("HI"),
    ]);
    let encoded = engine.encode(&object).expect("encode");

    // All three occurrences collapse to the first representative.
    assert_eq!(
        engine.decode(&encoded).expect("decode"),
        Object::sequence(vec![
            Object::text("HI"),
            Object::text("HI"),
            Object::text("HI"),
        ])
    );
}

#[test]
fn custom_sub_trees_not_interned() {
    let mut registry = Registry::new();
    registry
        .register("geo/1", 0, Arc::new(NestedMessageCodec))
        .expect("register failed");
    let engine = Engine::new(Arc::new(registry))
        .with_options(EncodeOptions::new().with_interning(InterningMode::AllRepeats));

    let custom = Object::Custom(CustomValue::new("geo/1", 0, Object::text("p")));
    let branch = Object::sequence(vec![custom, Object::text("tag")]);
    let object = Object::sequence(vec![branch.clone(), branch]);

    let encoded = engine.encode(&object).expect("encode");
    assert_eq!(engine.decode(&encoded).expect("decode"), object);
}

#[test]
fn unregistered_custom_type_fails() {
    let engine = plain_engine();
    let object = Object::Custom(CustomValue::new("geo/1", 0, Object::Nil));
    assert!(matches!(
        engine.encode(&object),
        Err(EngineError::UnregisteredType { namespace, type_id: 0 }) if namespace == "geo/1"
    ));
}

#[test]
fn raw_values_reencode_verbatim() {
    let engine = plain_engine();
    let raw = Object::Raw(RawCustom::new(
        NamespaceRef::name("unseen"),
        5,
        vec![0x01, 0x02],
    ));
    assert_eq!(
        engine.encode(&raw).expect("encode"),
        vec![
            0xc7, 0x0c, 0x08, // ext 8, 12 byte payload
            0xa6, 0x75, 0x6e, 0x73, 0x65, 0x65, 0x6e, // "unseen"
            0x05, // type id
            0xc4, 0x02, 0x01, 0x02, // bin payload
        ]
    );

    let by_id = Object::Raw(RawCustom::new(NamespaceRef::id(3), 1, vec![0xff]));
    assert_eq!(
        engine.encode(&by_id).expect("encode"),
        vec![0xc7, 0x05, 0x08, 0x03, 0x01, 0xc4, 0x01, 0xff]
    );
}

#[test]
fn namespace_ids_substituted_above_threshold() {
    let mut registry = Registry::new();
    registry
        .register("ns", 0, Arc::new(NestedMessageCodec))
        .expect("register failed");
    let engine = Engine::new(Arc::new(registry))
        .with_options(EncodeOptions::new().with_namespace_ids(2));

    let object = Object::sequence(vec![
        Object::Custom(CustomValue::new("ns", 0, Object::text("a"))),
        Object::Custom(CustomValue::new("ns", 0, Object::text("b"))),
    ]);

    let encoded = engine.encode(&object).expect("encode");
    let expected = vec![
        0xc7, 0x17, 0x07, // ext 7, 23 byte payload
        0xa2, 0x6e, 0x73, // "ns"
        0x00, // id 0
        0x92, // body array
        0xc7, 0x06, 0x08, 0x00, 0x00, 0xc4, 0x02, 0xa1, 0x61, // ext8(id 0, 0, "a")
        0xc7, 0x06, 0x08, 0x00, 0x00, 0xc4, 0x02, 0xa1, 0x62, // ext8(id 0, 0, "b")
    ];
    assert_eq!(encoded, expected);

    assert_eq!(engine.decode(&encoded).expect("decode"), object);
}

#[test]
fn namespace_ids_below_threshold_stay_inline() {
    let mut registry = Registry::new();
    registry
        .register("ns", 0, Arc::new(NestedMessageCodec))
        .expect("register failed");
    let engine = Engine::new(Arc::new(registry))
        .with_options(EncodeOptions::new().with_namespace_ids(2));

    let object = Object::Custom(CustomValue::new("ns", 0, Object::text("a")));
    let encoded = engine.encode(&object).expect("encode");
    // One occurrence: no envelope, string namespace, fixext8 framing.
    assert_eq!(
        encoded,
        vec![0xd7, 0x08, 0xa2, 0x6e, 0x73, 0x00, 0xc4, 0x02, 0xa1, 0x61]
    );
}
