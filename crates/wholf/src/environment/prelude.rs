//! Standard prelude with built-in functions

use super::Environment;
use crate::error::{type_name, NativeError};
use crate::host::Host;
use crate::value::{BuiltinFn, Value};

impl Environment {
    /// Create an environment with standard built-in functions.
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        env.load_prelude();
        env
    }

    /// Load the standard prelude into the global scope.
    pub fn load_prelude(&mut self) {
        // Console output
        self.define_builtin(BuiltinFn::new("print", -1, builtin_print));

        // File storage
        self.define_builtin(BuiltinFn::new("readFile", 1, builtin_read_file));
        self.define_builtin(BuiltinFn::new("writeFile", 2, builtin_write_file));

        // Type inspection
        self.define_builtin(BuiltinFn::new("typeOf", 1, builtin_type_of));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn builtin_print(args: &[Value], host: &dyn Host) -> Result<Value, NativeError> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    host.write_line(&line)?;
    Ok(Value::Undefined)
}

fn builtin_read_file(args: &[Value], host: &dyn Host) -> Result<Value, NativeError> {
    let path = string_arg(args, 0, "path")?;
    let contents = host.read_file(path)?;
    Ok(Value::string(contents))
}

fn builtin_write_file(args: &[Value], host: &dyn Host) -> Result<Value, NativeError> {
    let path = string_arg(args, 0, "path")?;
    let contents = match args.get(1) {
        Some(Value::String(s)) => s.to_string(),
        Some(other) => other.to_string(),
        None => return Err(NativeError::Message("missing contents".to_string())),
    };
    host.write_file(path, &contents)?;
    Ok(Value::Undefined)
}

fn builtin_type_of(args: &[Value], _host: &dyn Host) -> Result<Value, NativeError> {
    match args.first() {
        Some(Value::Instance(instance)) => Ok(Value::string(&instance.class.name)),
        Some(value) => Ok(Value::string(type_name(value))),
        None => Err(NativeError::Message("missing argument".to_string())),
    }
}

fn string_arg<'a>(args: &'a [Value], index: usize, what: &str) -> Result<&'a str, NativeError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(&**s),
        Some(other) => Err(NativeError::Message(format!(
            "{what} must be a string, got `{}`",
            type_name(other)
        ))),
        None => Err(NativeError::Message(format!("missing {what}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BufferHost;

    fn call(env: &Environment, name: &str, args: &[Value], host: &BufferHost) -> Result<Value, NativeError> {
        match env.get(name) {
            Some(Value::BuiltinFn(b)) => (b.func)(args, host),
            other => panic!("{name} is not a builtin: {other:?}"),
        }
    }

    #[test]
    fn test_prelude_defines_builtins_globally() {
        let env = Environment::with_prelude();
        for name in ["print", "readFile", "writeFile", "typeOf"] {
            assert!(env.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_print_joins_with_single_space() {
        let env = Environment::with_prelude();
        let host = BufferHost::new();
        call(
            &env,
            "print",
            &[Value::string("a"), Value::Integer(1), Value::Null],
            &host,
        )
        .unwrap();
        call(&env, "print", &[], &host).unwrap();
        assert_eq!(host.output(), "a 1 null\n\n");
    }

    #[test]
    fn test_file_builtins_use_host() {
        let env = Environment::with_prelude();
        let host = BufferHost::new();
        call(&env, "writeFile", &[Value::string("f"), Value::Integer(42)], &host).unwrap();
        let read = call(&env, "readFile", &[Value::string("f")], &host).unwrap();
        assert_eq!(read, Value::string("42"));
    }

    #[test]
    fn test_read_file_rejects_non_string_path() {
        let env = Environment::with_prelude();
        let host = BufferHost::new();
        let err = call(&env, "readFile", &[Value::Integer(1)], &host).unwrap_err();
        assert!(matches!(err, NativeError::Message(ref m) if m.contains("path must be a string")));
    }

    #[test]
    fn test_host_failure_is_host_error() {
        let env = Environment::with_prelude();
        let host = BufferHost::without_storage();
        let err = call(&env, "readFile", &[Value::string("f")], &host).unwrap_err();
        assert!(matches!(err, NativeError::Host(_)));
    }

    #[test]
    fn test_type_of() {
        let env = Environment::with_prelude();
        let host = BufferHost::new();
        let kind = call(&env, "typeOf", &[Value::Float(1.5)], &host).unwrap();
        assert_eq!(kind, Value::string("float"));
    }
}
