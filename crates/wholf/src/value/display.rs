//! Display and Debug implementations for Value

use std::fmt;

use super::*;

/// Nesting beyond this prints `...`; arrays can contain themselves.
const MAX_DISPLAY_DEPTH: usize = 32;

/// Render a float the way the language prints numbers.
pub(crate) fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", n)
    }
}

fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    quote_strings: bool,
    depth: usize,
) -> fmt::Result {
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Null => write!(f, "null"),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Integer(n) => write!(f, "{}", n),
        Value::Float(n) => write!(f, "{}", format_float(*n)),

        Value::String(s) if quote_strings => write!(f, "{:?}", s.as_ref()),
        Value::String(s) => write!(f, "{}", s),

        Value::Array(_) | Value::Object(_) if depth >= MAX_DISPLAY_DEPTH => write!(f, "..."),

        Value::Array(items) => {
            write!(f, "[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, item, true, depth + 1)?;
            }
            write!(f, "]")
        }

        Value::Object(entries) => {
            let entries = entries.borrow();
            if entries.is_empty() {
                return write!(f, "{{}}");
            }
            write!(f, "{{ ")?;
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: ", k)?;
                write_value(f, v, true, depth + 1)?;
            }
            write!(f, " }}")
        }

        Value::Instance(instance) => write!(f, "<{} instance>", instance.class.name),
        Value::Function(func) => write!(f, "<function {}>", func.name()),
        Value::BuiltinFn(b) => write!(f, "<builtin {}>", b.name),
        Value::Class(class) => write!(f, "<class {}>", class.name),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, true, 0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Top-level strings print bare; nested ones are quoted
        write_value(f, self, false, 0)
    }
}
