//! Text builtins. All positions, counts, and length caps are in characters,
//! never bytes; a result longer than the 32,767-character cell limit is
//! `#VALUE!`.

use chrono::Datelike;

use crate::coerce;
use crate::locale::Culture;
use crate::value::{ErrorKind, Scalar, Value};

use super::wildcard::WildcardPattern;
use super::{
    builtins_date_time, Call, FunctionImpl, FunctionSpec, ParamKind, ReturnShape, SideEffect,
    Signature, Volatility,
};

const VAR_ARGS: usize = crate::EXCEL_MAX_ARGS;
/// Longest text a cell can hold.
const RESULT_LIMIT: usize = 32_767;

static ONE_TEXT: Signature = Signature::fixed(&[ParamKind::Text]);
static TEXT_WITH_COUNT: Signature =
    Signature::fixed(&[ParamKind::Text, ParamKind::OptionalNumber(1.0)]);
static MID_ARGS: Signature =
    Signature::fixed(&[ParamKind::Text, ParamKind::Number, ParamKind::Number]);
static TWO_TEXTS: Signature = Signature::fixed(&[ParamKind::Text, ParamKind::Text]);
static FIND_ARGS: Signature = Signature::fixed(&[
    ParamKind::Text,
    ParamKind::Text,
    ParamKind::OptionalNumber(1.0),
]);
static REPLACE_ARGS: Signature = Signature::fixed(&[
    ParamKind::Text,
    ParamKind::Number,
    ParamKind::Number,
    ParamKind::Text,
]);
static SUBSTITUTE_ARGS: Signature = Signature::fixed(&[
    ParamKind::Text,
    ParamKind::Text,
    ParamKind::Text,
    ParamKind::OptionalScalar,
]);
static REPT_ARGS: Signature = Signature::fixed(&[ParamKind::Text, ParamKind::Number]);
static ONE_SCALAR: Signature = Signature::fixed(&[ParamKind::Scalar]);
static ONE_NUMBER: Signature = Signature::fixed(&[ParamKind::Number]);
static VALUES: Signature = Signature::variadic(&[]);
static TEXTJOIN_ARGS: Signature = Signature::variadic(&[ParamKind::Text, ParamKind::Logical]);
static HYPERLINK_ARGS: Signature =
    Signature::fixed(&[ParamKind::Text, ParamKind::OptionalScalar]);

inventory::submit! {
    FunctionSpec {
        name: "LEN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, len),
    }
}

fn len(call: &Call<'_>) -> Value {
    Value::from(call.text(0).chars().count() as f64)
}

inventory::submit! {
    FunctionSpec {
        name: "LEFT",
        min_args: 1,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TEXT_WITH_COUNT, left),
    }
}

fn left(call: &Call<'_>) -> Value {
    let count = call.number(1).trunc();
    if count < 0.0 {
        return Value::from(ErrorKind::Value);
    }
    let taken: String = call.text(0).chars().take(count as usize).collect();
    Value::from(taken)
}

inventory::submit! {
    FunctionSpec {
        name: "RIGHT",
        min_args: 1,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TEXT_WITH_COUNT, right),
    }
}

fn right(call: &Call<'_>) -> Value {
    let count = call.number(1).trunc();
    if count < 0.0 {
        return Value::from(ErrorKind::Value);
    }
    let text = call.text(0);
    let len = text.chars().count();
    let keep = (count as usize).min(len);
    let taken: String = text.chars().skip(len - keep).collect();
    Value::from(taken)
}

inventory::submit! {
    FunctionSpec {
        name: "MID",
        min_args: 3,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&MID_ARGS, mid),
    }
}

fn mid(call: &Call<'_>) -> Value {
    let start = call.number(1).trunc();
    let count = call.number(2).trunc();
    if start < 1.0 || count < 0.0 {
        return Value::from(ErrorKind::Value);
    }
    let taken: String = call
        .text(0)
        .chars()
        .skip(start as usize - 1)
        .take(count as usize)
        .collect();
    Value::from(taken)
}

inventory::submit! {
    FunctionSpec {
        name: "UPPER",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, upper),
    }
}

fn upper(call: &Call<'_>) -> Value {
    Value::from(call.text(0).to_uppercase())
}

inventory::submit! {
    FunctionSpec {
        name: "LOWER",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, lower),
    }
}

fn lower(call: &Call<'_>) -> Value {
    Value::from(call.text(0).to_lowercase())
}

inventory::submit! {
    FunctionSpec {
        name: "PROPER",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, proper),
    }
}

fn proper(call: &Call<'_>) -> Value {
    // Excel quirk: every non-letter restarts a word, so PROPER("don't")
    // is "Don'T".
    let text = call.text(0);
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "TRIM",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, trim),
    }
}

fn trim(call: &Call<'_>) -> Value {
    // Only ASCII spaces are trimmed and collapsed; non-breaking spaces
    // survive, as in Excel.
    let text = call.text(0);
    let mut out = String::with_capacity(text.len());
    let mut pending = false;
    for c in text.chars() {
        if c == ' ' {
            pending = !out.is_empty();
        } else {
            if pending {
                out.push(' ');
                pending = false;
            }
            out.push(c);
        }
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "CLEAN",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, clean),
    }
}

fn clean(call: &Call<'_>) -> Value {
    // Excel quirk: only codes 0-31 are stripped; DEL and the C1 block stay.
    let cleaned: String = call.text(0).chars().filter(|c| *c as u32 >= 32).collect();
    Value::from(cleaned)
}

inventory::submit! {
    FunctionSpec {
        name: "CHAR",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_NUMBER, char_fn),
    }
}

fn char_fn(call: &Call<'_>) -> Value {
    let code = call.number(0).trunc();
    if !(1.0..=255.0).contains(&code) {
        return Value::from(ErrorKind::Value);
    }
    // Codes 128-255 read as Latin-1, which maps straight onto Unicode.
    Value::from((code as u8 as char).to_string())
}

inventory::submit! {
    FunctionSpec {
        name: "CODE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, code),
    }
}

fn code(call: &Call<'_>) -> Value {
    match call.text(0).chars().next() {
        Some(c) => Value::from(f64::from(u32::from(c))),
        None => Value::from(ErrorKind::Value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "EXACT",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TWO_TEXTS, exact),
    }
}

fn exact(call: &Call<'_>) -> Value {
    // Case-sensitive, unlike the `=` operator.
    Value::from(call.text(0) == call.text(1))
}

inventory::submit! {
    FunctionSpec {
        name: "FIND",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&FIND_ARGS, find),
    }
}

fn find(call: &Call<'_>) -> Value {
    // Case-sensitive; `?` and `*` are ordinary characters here.
    let needle: Vec<char> = call.text(0).chars().collect();
    let hay: Vec<char> = call.text(1).chars().collect();
    let start = call.number(2).trunc();
    if start < 1.0 || start as usize > hay.len() + 1 {
        return Value::from(ErrorKind::Value);
    }
    let from = start as usize - 1;
    let last = match hay.len().checked_sub(needle.len()) {
        Some(last) => last,
        None => return Value::from(ErrorKind::Value),
    };
    match (from..=last).find(|&i| hay[i..i + needle.len()] == needle[..]) {
        Some(i) => Value::from((i + 1) as f64),
        None => Value::from(ErrorKind::Value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "SEARCH",
        min_args: 2,
        max_args: 3,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&FIND_ARGS, search),
    }
}

fn search(call: &Call<'_>) -> Value {
    // Case-insensitive, and the needle may use `?`/`*`/`~` wildcards.
    let hay = call.text(1);
    let start = call.number(2).trunc();
    if start < 1.0 || start as usize > hay.chars().count() + 1 {
        return Value::from(ErrorKind::Value);
    }
    let pattern = WildcardPattern::new(call.text(0));
    match pattern.find_in(hay, start as usize - 1) {
        Some(pos) => Value::from((pos + 1) as f64),
        None => Value::from(ErrorKind::Value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "REPLACE",
        min_args: 4,
        max_args: 4,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&REPLACE_ARGS, replace),
    }
}

fn replace(call: &Call<'_>) -> Value {
    let start = call.number(1).trunc();
    let count = call.number(2).trunc();
    if start < 1.0 || count < 0.0 {
        return Value::from(ErrorKind::Value);
    }
    let text = call.text(0);
    let start = start as usize - 1;
    let mut out: String = text.chars().take(start).collect();
    out.push_str(call.text(3));
    out.extend(text.chars().skip(start.saturating_add(count as usize)));
    if out.chars().count() > RESULT_LIMIT {
        return Value::from(ErrorKind::Value);
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "SUBSTITUTE",
        min_args: 3,
        max_args: 4,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&SUBSTITUTE_ARGS, substitute),
    }
}

fn substitute(call: &Call<'_>) -> Value {
    let culture = call.culture();
    let instance = match call.opt_scalar(3) {
        None => None,
        Some(s) => match coerce::to_number(s, &culture) {
            Ok(n) if n.trunc() >= 1.0 => Some(n.trunc() as usize),
            Ok(_) => return Value::from(ErrorKind::Value),
            Err(e) => return Value::from(e),
        },
    };
    let text = call.text(0);
    let old = call.text(1);
    let new = call.text(2);
    if old.is_empty() {
        return Value::from(text.to_string());
    }
    let out = match instance {
        None => text.replace(old, new),
        Some(n) => match text.match_indices(old).nth(n - 1) {
            Some((pos, _)) => {
                let mut out = String::with_capacity(text.len());
                out.push_str(&text[..pos]);
                out.push_str(new);
                out.push_str(&text[pos + old.len()..]);
                out
            }
            None => text.to_string(),
        },
    };
    if out.chars().count() > RESULT_LIMIT {
        return Value::from(ErrorKind::Value);
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "REPT",
        min_args: 2,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&REPT_ARGS, rept),
    }
}

fn rept(call: &Call<'_>) -> Value {
    let count = call.number(1).trunc();
    if count < 0.0 {
        return Value::from(ErrorKind::Value);
    }
    let count = count as usize;
    let unit = call.text(0);
    if unit.chars().count().saturating_mul(count) > RESULT_LIMIT {
        return Value::from(ErrorKind::Value);
    }
    Value::from(unit.repeat(count))
}

inventory::submit! {
    FunctionSpec {
        name: "VALUE",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_TEXT, value_fn),
    }
}

fn value_fn(call: &Call<'_>) -> Value {
    let text = call.text(0);
    let culture = call.culture();
    if let Some(n) = coerce::parse_number_text(text, &culture) {
        return super::number_value(Ok(n));
    }
    // Not a plain number; date and time text convert to serials too.
    let system = call.cells().date_system();
    let year = call.cells().now_utc().year();
    match builtins_date_time::parse_temporal_text(text, &culture, system, year) {
        Some(parts) => Value::from(parts.serial()),
        None => Value::from(ErrorKind::Value),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "T",
        min_args: 1,
        max_args: 1,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&ONE_SCALAR, t_fn),
    }
}

fn t_fn(call: &Call<'_>) -> Value {
    match call.scalar(0) {
        Scalar::Text(s) => Value::from(s.clone()),
        Scalar::Error(e) => Value::from(*e),
        _ => Value::from(String::new()),
    }
}

inventory::submit! {
    FunctionSpec {
        name: "CONCATENATE",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, concatenate),
    }
}

fn concatenate(call: &Call<'_>) -> Value {
    // The legacy form joins scalars only; a multi-cell range is #VALUE!.
    let culture = call.culture();
    let mut out = String::new();
    let mut len = 0usize;
    for source in call.values() {
        let view = match source.to_view() {
            Ok(view) => view,
            Err(e) => return Value::from(e),
        };
        if view.cell_count() != 1 {
            return Value::from(ErrorKind::Value);
        }
        if let Err(e) = append_text(&mut out, &mut len, &view.at_offset(0), &culture) {
            return Value::from(e);
        }
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "CONCAT",
        min_args: 1,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&VALUES, concat),
    }
}

fn concat(call: &Call<'_>) -> Value {
    let culture = call.culture();
    let mut out = String::new();
    let mut len = 0usize;
    for source in call.values() {
        let walked =
            source.for_each(&mut |_, scalar| append_text(&mut out, &mut len, &scalar, &culture));
        if let Err(e) = walked {
            return Value::from(e);
        }
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "TEXTJOIN",
        min_args: 3,
        max_args: VAR_ARGS,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::Pure,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&TEXTJOIN_ARGS, textjoin),
    }
}

fn textjoin(call: &Call<'_>) -> Value {
    let culture = call.culture();
    let delimiter = call.text(0);
    let ignore_empty = call.logical(1);
    let delim_len = delimiter.chars().count();
    let mut out = String::new();
    let mut len = 0usize;
    let mut first = true;
    for source in call.values() {
        let walked = source.for_each(&mut |_, scalar| {
            if ignore_empty && matches!(scalar, Scalar::Blank) {
                return Ok(());
            }
            let piece = coerce::to_text(&scalar, &culture)?;
            if ignore_empty && piece.is_empty() {
                return Ok(());
            }
            let mut needed = piece.chars().count();
            if !first {
                needed += delim_len;
            }
            if len + needed > RESULT_LIMIT {
                return Err(ErrorKind::Value);
            }
            if !first {
                out.push_str(delimiter);
            }
            out.push_str(&piece);
            len += needed;
            first = false;
            Ok(())
        });
        if let Err(e) = walked {
            return Value::from(e);
        }
    }
    Value::from(out)
}

inventory::submit! {
    FunctionSpec {
        name: "HYPERLINK",
        min_args: 1,
        max_args: 2,
        volatility: Volatility::NonVolatile,
        side_effect: SideEffect::MutatesPresentation,
        returns: ReturnShape::Scalar,
        implementation: FunctionImpl::Eager(&HYPERLINK_ARGS, hyperlink),
    }
}

fn hyperlink(call: &Call<'_>) -> Value {
    let location = call.text(0);
    let display = match call.opt_scalar(1) {
        Some(Scalar::Error(e)) => return Value::from(*e),
        Some(s) => s.clone(),
        None => Scalar::Text(location.to_string()),
    };
    let friendly = match coerce::to_text(&display, &call.culture()) {
        Ok(s) => s,
        Err(e) => return Value::from(e),
    };
    call.cells().register_hyperlink(location, &friendly);
    // The cell shows the friendly value with its original type.
    Value::Scalar(display)
}

/// Appends one coerced piece to a joined result, tracking the running
/// character count against the cell limit.
fn append_text(
    out: &mut String,
    len: &mut usize,
    scalar: &Scalar,
    culture: &Culture,
) -> Result<(), ErrorKind> {
    let piece = coerce::to_text(scalar, culture)?;
    *len += piece.chars().count();
    if *len > RESULT_LIMIT {
        return Err(ErrorKind::Value);
    }
    out.push_str(&piece);
    Ok(())
}
