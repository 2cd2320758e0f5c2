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

use crate::{CustomValue, NamespaceRef, Object, ObjectKind, RawCustom};

#[test]
fn object_kinds() {
    assert_eq!(Object::Nil.kind(), ObjectKind::Nil);
    assert_eq!(Object::from(true).kind(), ObjectKind::Boolean);
    assert_eq!(Object::from(-4i64).kind(), ObjectKind::Int64);
    assert_eq!(Object::from(4u64).kind(), ObjectKind::UInt64);
    assert_eq!(Object::from(0.5f64).kind(), ObjectKind::Float64);
    assert_eq!(Object::text("name").kind(), ObjectKind::Text);
    assert_eq!(Object::data(vec![1, 2, 3]).kind(), ObjectKind::Data);
    assert_eq!(Object::empty_sequence().kind(), ObjectKind::Sequence);
    assert_eq!(Object::mapping(vec![]).kind(), ObjectKind::Mapping);
}

#[test]
fn native_objects() {
    let native = Object::sequence(vec![
        Object::from(1u64),
        Object::mapping(vec![(Object::text("key"), Object::Nil)]),
    ]);
    assert!(native.is_native());

    let custom = Object::sequence(vec![
        Object::from(1u64),
        Object::Custom(CustomValue::new("example/1", 0, Object::Nil)),
    ]);
    assert!(!custom.is_native());

    let raw = Object::mapping(vec![(
        Object::text("key"),
        Object::Raw(RawCustom::new("example/1", 2, vec![0x01])),
    )]);
    assert!(!raw.is_native());
}

#[test]
fn namespace_ref_display() {
    assert_eq!(NamespaceRef::name("geo/2").to_string(), "geo/2");
    assert_eq!(NamespaceRef::id(7).to_string(), "#7");
}

#[test]
fn text_conversions() {
    assert_eq!(Object::from("hi"), Object::Text("hi".to_owned()));
    assert_eq!(Object::from("hi".to_owned()), Object::text("hi"));
}
