// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP entity-line parser using nom.
//!
//! Tokenizes one `#id=TYPE(arg, arg, ...);` entity instance at a time. The
//! store drives it from a byte-offset scan, so the parser never sees more
//! than a single record.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::record::EntityKind;

/// One tokenized attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: `#123`
    EntityRef(u32),
    /// String literal: `'text'`
    String(&'a str),
    /// Integer: `42`
    Integer(i64),
    /// Float: `3.14`, `0.`, `1.5E-10`
    Float(f64),
    /// Enum literal: `.FLOOR.`
    Enum(&'a str),
    /// List: `(1, 2, 3)`, possibly nested
    List(Vec<Token<'a>>),
    /// Typed value: `IFCPARAMETERVALUE(0.)`
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null: `$`
    Null,
    /// Derived: `*`
    Derived,
}

fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

fn reference(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// String content up to an unescaped closing quote. STEP doubles the quote
/// character to escape it within a string.
fn quoted_content(input: &str, quote: u8) -> IResult<&str, &str> {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok((&input[i..], &input[..i]));
        }
        i += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    alt((
        map(
            delimited(char('\''), |i| quoted_content(i, b'\''), char('\'')),
            Token::String,
        ),
        map(
            delimited(char('"'), |i| quoted_content(i, b'"'), char('"')),
            Token::String,
        ),
    ))(input)
}

fn integer(input: &str) -> IResult<&str, Token> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>().map(Token::Integer)
    })(input)
}

/// STEP floats may omit fractional digits (`0.`) and carry an exponent.
fn float(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

fn enum_literal(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('.'),
        ),
        Token::Enum,
    )(input)
}

fn list(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('('),
            separated_list0(delimited(ws, char(','), ws), token),
            char(')'),
        ),
        Token::List,
    )(input)
}

fn typed_value(input: &str) -> IResult<&str, Token> {
    map(
        pair(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            delimited(
                char('('),
                separated_list0(delimited(ws, char(','), ws), token),
                char(')'),
            ),
        ),
        |(name, args)| Token::TypedValue(name, args),
    )(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            float, // before integer: floats start with the same digits
            integer,
            reference,
            string_literal,
            enum_literal,
            list,
            typed_value,
            map(char('$'), |_| Token::Null),
            map(char('*'), |_| Token::Derived),
        )),
        ws,
    )(input)
}

/// Parse a complete record line: `#123=IFCWALL('guid',$,...);`
///
/// Unrecognized type tags resolve to [`EntityKind::Other`] rather than
/// failing, so auxiliary records remain resolvable reference targets.
pub fn parse_record(input: &str) -> Result<(u32, EntityKind, Vec<Token>)> {
    let result: IResult<&str, (u32, &str, Vec<Token>)> = tuple((
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        preceded(
            char('='),
            delimited(
                ws,
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                ws,
            ),
        ),
        delimited(
            char('('),
            separated_list0(delimited(ws, char(','), ws), token),
            tuple((char(')'), ws, char(';'))),
        ),
    ))(input);

    match result {
        Ok((_, (id, type_name, args))) => Ok((id, EntityKind::from_type_name(type_name), args)),
        Err(e) => Err(Error::malformed(0, format!("{e}"))),
    }
}
