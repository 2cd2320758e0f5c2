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

use super::*;
use crate::{read_token, ExtToken, Token};

fn written(token: &Token) -> Vec<u8> {
    let mut buffer = Vec::new();
    write_token(&mut buffer, token).expect("write failed");
    buffer
}

#[test]
fn minimal_integer_encodings() {
    assert_eq!(written(&Token::UInt(1)), vec![1]);
    assert_eq!(written(&Token::UInt(42)), vec![42]);
    assert_eq!(written(&Token::UInt(127)), vec![127]);
    assert_eq!(written(&Token::UInt(128)), vec![0xcc, 128]);
    assert_eq!(written(&Token::UInt(256)), vec![0xcd, 1, 0]);
    assert_eq!(written(&Token::UInt(65535)), vec![0xcd, 255, 255]);
    assert_eq!(written(&Token::UInt(65536)), vec![0xce, 0, 1, 0, 0]);
    assert_eq!(written(&Token::Int(-1)), vec![0xff]);
    assert_eq!(written(&Token::Int(-32)), vec![0xe0]);
    assert_eq!(written(&Token::Int(-33)), vec![0xd0, 223]);
    assert_eq!(written(&Token::Int(42)), vec![42]);
}

#[test]
fn scalar_encodings() {
    assert_eq!(written(&Token::Nil), vec![0xc0]);
    assert_eq!(written(&Token::Bool(false)), vec![0xc2]);
    assert_eq!(written(&Token::Bool(true)), vec![0xc3]);
    assert_eq!(
        written(&Token::F32(3.14)),
        vec![0xca, 0x40, 0x48, 0xf5, 0xc3]
    );
    assert_eq!(
        written(&Token::F64(3.14)),
        vec![0xcb, 0x40, 0x09, 0x1e, 0xb8, 0x51, 0xeb, 0x85, 0x1f]
    );
}

#[test]
fn string_and_binary_encodings() {
    assert_eq!(
        written(&Token::Str("hello".to_owned())),
        vec![0xa5, 0x68, 0x65, 0x6c, 0x6c, 0x6f]
    );
    assert_eq!(
        written(&Token::Bin(b"hello".to_vec())),
        vec![0xc4, 0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f]
    );
}

#[test]
fn container_header_encodings() {
    assert_eq!(written(&Token::ArrayHeader(3)), vec![0x93]);
    assert_eq!(written(&Token::MapHeader(2)), vec![0x82]);
    assert_eq!(written(&Token::ArrayHeader(256)), vec![0xdc, 0x01, 0x00]);
}

#[test]
fn ext_encodings() {
    assert_eq!(
        written(&Token::Ext(ExtToken::new(6, vec![0x00]))),
        vec![0xd4, 0x06, 0x00]
    );
    assert_eq!(
        written(&Token::Ext(ExtToken::new(8, vec![1, 2, 3]))),
        vec![0xc7, 0x03, 0x08, 0x01, 0x02, 0x03]
    );
}

#[test]
fn tokens_round_trip() {
    let tokens = [
        Token::Nil,
        Token::Bool(true),
        Token::Int(-87657),
        Token::UInt(105678750199),
        Token::F64(123e-78),
        Token::Str("a moderately long sentence with quite a few words in it".to_owned()),
        Token::Bin(vec![7; 300]),
        Token::ArrayHeader(12),
        Token::MapHeader(4),
        Token::Ext(ExtToken::new(7, vec![0xa2, 0x6e, 0x73, 0x01])),
    ];
    for token in &tokens {
        let bytes = written(token);
        let mut input = bytes.as_slice();
        let restored = read_token(&mut input).expect("read failed");
        assert!(input.is_empty());
        match (token, &restored) {
            // Non-negative signed integers read back as uints.
            (Token::Int(n), Token::UInt(m)) if *n >= 0 => assert_eq!(*n as u64, *m),
            _ => assert_eq!(token, &restored),
        }
    }
}
