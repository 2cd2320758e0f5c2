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

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::Utf8Error;

use bytes::Buf;
use rmp::Marker;

use crate::{ExtToken, Token};


/// Reading msgpack data can fail if the bytes do not constitute valid
/// msgpack or the buffer contains an incomplete value.
#[derive(Debug, PartialEq)]
pub enum MsgPackReadError {
    /// The data contained invalid UTF8 in a string.
    StringDecode(Utf8Error),
    /// An unexpected msgpack marker was encountered.
    InvalidMarker(Marker),
    /// The input terminated mid-way through a value.
    Incomplete,
    /// Not all of the input was consumed.
    UnconsumedData,
}

impl Display for MsgPackReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgPackReadError::StringDecode(_) => {
                write!(f, "A string value contained invalid UTF8.")
            }
            MsgPackReadError::InvalidMarker(marker) => {
                write!(f, "Unexpected message pack marker: {:?}", marker)
            }
            MsgPackReadError::Incomplete => {
                write!(f, "The input ended part way through a value.")
            }
            MsgPackReadError::UnconsumedData => {
                write!(f, "Not all of the input was consumed.")
            }
        }
    }
}

impl std::error::Error for MsgPackReadError {}

impl From<Utf8Error> for MsgPackReadError {
    fn from(err: Utf8Error) -> Self {
        MsgPackReadError::StringDecode(err)
    }
}

/// Read the next msgpack token from a buffer. Array and map tokens consume
/// only the header; extension tokens consume the entire envelope, including
/// the payload, without interpreting the extension code.
pub fn read_token<R: Buf>(input: &mut R) -> Result<Token, MsgPackReadError> {
    let marker = read_marker(input)?;
    match marker {
        Marker::Null => Ok(Token::Nil),
        Marker::True => Ok(Token::Bool(true)),
        Marker::False => Ok(Token::Bool(false)),
        Marker::FixPos(n) => Ok(Token::UInt(n as u64)),
        Marker::FixNeg(n) => Ok(Token::Int(n as i64)),
        Marker::I8 => {
            check_remaining::<i8, R>(input)?;
            Ok(Token::Int(input.get_i8() as i64))
        }
        Marker::I16 => {
            check_remaining::<i16, R>(input)?;
            Ok(Token::Int(input.get_i16() as i64))
        }
        Marker::I32 => {
            check_remaining::<i32, R>(input)?;
            Ok(Token::Int(input.get_i32() as i64))
        }
        Marker::I64 => {
            check_remaining::<i64, R>(input)?;
            Ok(Token::Int(input.get_i64()))
        }
        Marker::U8 => {
            check_remaining::<u8, R>(input)?;
            Ok(Token::UInt(input.get_u8() as u64))
        }
        Marker::U16 => {
            check_remaining::<u16, R>(input)?;
            Ok(Token::UInt(input.get_u16() as u64))
        }
        Marker::U32 => {
            check_remaining::<u32, R>(input)?;
            Ok(Token::UInt(input.get_u32() as u64))
        }
        Marker::U64 => {
            check_remaining::<u64, R>(input)?;
            Ok(Token::UInt(input.get_u64()))
        }
        Marker::F32 => {
            check_remaining::<f32, R>(input)?;
            Ok(Token::F32(input.get_f32()))
        }
        Marker::F64 => {
            check_remaining::<f64, R>(input)?;
            Ok(Token::F64(input.get_f64()))
        }
        Marker::FixStr(len) => read_string(input, len as u32),
        Marker::Str8 => {
            let len = read_len_u8(input)?;
            read_string(input, len)
        }
        Marker::Str16 => {
            let len = read_len_u16(input)?;
            read_string(input, len)
        }
        Marker::Str32 => {
            let len = read_len_u32(input)?;
            read_string(input, len)
        }
        Marker::Bin8 => {
            let len = read_len_u8(input)?;
            Ok(Token::Bin(read_blob(input, len)?))
        }
        Marker::Bin16 => {
            let len = read_len_u16(input)?;
            Ok(Token::Bin(read_blob(input, len)?))
        }
        Marker::Bin32 => {
            let len = read_len_u32(input)?;
            Ok(Token::Bin(read_blob(input, len)?))
        }
        Marker::FixArray(n) => Ok(Token::ArrayHeader(n as u32)),
        Marker::Array16 => Ok(Token::ArrayHeader(read_len_u16(input)?)),
        Marker::Array32 => Ok(Token::ArrayHeader(read_len_u32(input)?)),
        Marker::FixMap(n) => Ok(Token::MapHeader(n as u32)),
        Marker::Map16 => Ok(Token::MapHeader(read_len_u16(input)?)),
        Marker::Map32 => Ok(Token::MapHeader(read_len_u32(input)?)),
        marker if is_ext(marker) => {
            let len = read_ext_size(input, marker)?;
            if !input.has_remaining() {
                return Err(MsgPackReadError::Incomplete);
            }
            let code = input.get_i8();
            let payload = read_blob(input, len)?;
            Ok(Token::Ext(ExtToken::new(code, payload)))
        }
        ow => Err(MsgPackReadError::InvalidMarker(ow)),
    }
}

/// Read one complete msgpack value, discarding its content. Used to skip
/// over values without materializing them.
pub fn skip_value<R: Buf>(input: &mut R) -> Result<(), MsgPackReadError> {
    let mut pending: u64 = 1;
    while pending > 0 {
        pending -= 1;
        match read_token(input)? {
            Token::ArrayHeader(n) => pending += n as u64,
            Token::MapHeader(n) => pending += 2 * n as u64,
            _ => {}
        }
    }
    Ok(())
}

fn read_marker<R>(input: &mut R) -> Result<Marker, MsgPackReadError>
where
    R: Buf,
{
    if !input.has_remaining() {
        Err(MsgPackReadError::Incomplete)
    } else {
        Ok(Marker::from_u8(input.get_u8()))
    }
}

fn check_remaining<T, R: Buf>(input: &mut R) -> Result<(), MsgPackReadError> {
    if input.remaining() < std::mem::size_of::<T>() {
        Err(MsgPackReadError::Incomplete)
    } else {
        Ok(())
    }
}

fn read_len_u8<R: Buf>(input: &mut R) -> Result<u32, MsgPackReadError> {
    check_remaining::<u8, R>(input)?;
    Ok(input.get_u8() as u32)
}

fn read_len_u16<R: Buf>(input: &mut R) -> Result<u32, MsgPackReadError> {
    check_remaining::<u16, R>(input)?;
    Ok(input.get_u16() as u32)
}

fn read_len_u32<R: Buf>(input: &mut R) -> Result<u32, MsgPackReadError> {
    check_remaining::<u32, R>(input)?;
    Ok(input.get_u32())
}

fn is_ext(marker: Marker) -> bool {
    matches!(
        marker,
        Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16
            | Marker::Ext8
            | Marker::Ext16
            | Marker::Ext32
    )
}

fn read_ext_size<R>(input: &mut R, marker: Marker) -> Result<u32, MsgPackReadError>
where
    R: Buf,
{
    match marker {
        Marker::FixExt1 => Ok(1),
        Marker::FixExt2 => Ok(2),
        Marker::FixExt4 => Ok(4),
        Marker::FixExt8 => Ok(8),
        Marker::FixExt16 => Ok(16),
        Marker::Ext8 => read_len_u8(input),
        Marker::Ext16 => read_len_u16(input),
        Marker::Ext32 => read_len_u32(input),
        _ => Err(MsgPackReadError::InvalidMarker(marker)),
    }
}

fn read_string<R>(input: &mut R, len: u32) -> Result<Token, MsgPackReadError>
where
    R: Buf,
{
    let bytes = read_blob(input, len)?;
    let string = std::str::from_utf8(bytes.as_slice())?;
    Ok(Token::Str(string.to_owned()))
}

fn read_blob<R>(input: &mut R, len: u32) -> Result<Vec<u8>, MsgPackReadError>
where
    R: Buf,
{
    let len = usize::try_from(len).expect("u32 did not fit into usize");
    if input.remaining() < len {
        Err(MsgPackReadError::Incomplete)
    } else {
        let bytes = input.copy_to_bytes(len);
        Ok(Vec::from(bytes.as_ref()))
    }
}
