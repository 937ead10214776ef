//! Demo capabilities registered by `disc run`: integer math, text
//! utilities, and a stdout logger. Enough surface to exercise heap
//! substitution and result capture from a scenario file.

use disc_core::{ArgValue, DiscError, ParamType};
use disc_runtime::{Capability, Directory, OperationSpec};

/// Builds the directory the CLI runs scenarios against.
pub fn demo_directory() -> Directory {
    let mut directory = Directory::new();
    directory.register(Box::new(Math));
    directory.register(Box::new(Text));
    directory.register(Box::new(Log));
    directory
}

/// Integer and float arithmetic under the name `math`.
pub struct Math;

impl Capability for Math {
    fn type_name(&self) -> &str {
        "math"
    }

    fn operations(&self) -> Vec<OperationSpec> {
        vec![
            OperationSpec::new("add", vec![ParamType::Int, ParamType::Int]),
            OperationSpec::new("sub", vec![ParamType::Int, ParamType::Int]),
            OperationSpec::new("mul", vec![ParamType::Int, ParamType::Int]),
            OperationSpec::new("div", vec![ParamType::Float, ParamType::Float]),
        ]
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[ArgValue],
    ) -> Result<Option<ArgValue>, DiscError> {
        match operation {
            "add" | "sub" | "mul" => {
                let (lhs, rhs) = int_pair(operation, args)?;
                let value = match operation {
                    "add" => lhs + rhs,
                    "sub" => lhs - rhs,
                    _ => lhs * rhs,
                };
                Ok(Some(ArgValue::Int(value)))
            }
            "div" => {
                let lhs = float_arg(operation, args, 0)?;
                let rhs = float_arg(operation, args, 1)?;
                if rhs == 0.0 {
                    return Err(DiscError::new("MATH_DIV_ZERO", "Division by zero."));
                }
                Ok(Some(ArgValue::Float(lhs / rhs)))
            }
            _ => Err(DiscError::new(
                "MATH_UNKNOWN_OP",
                format!("No math operation \"{operation}\"."),
            )),
        }
    }
}

/// Text utilities under the name `text`.
pub struct Text;

impl Capability for Text {
    fn type_name(&self) -> &str {
        "text"
    }

    fn operations(&self) -> Vec<OperationSpec> {
        vec![
            OperationSpec::new("upper", vec![ParamType::Text]),
            OperationSpec::new("concat", vec![ParamType::Text, ParamType::Text]),
            OperationSpec::new("len", vec![ParamType::Text]),
        ]
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[ArgValue],
    ) -> Result<Option<ArgValue>, DiscError> {
        match operation {
            "upper" => {
                let value = text_arg(operation, args, 0)?;
                Ok(Some(ArgValue::Text(value.to_uppercase())))
            }
            "concat" => {
                let lhs = text_arg(operation, args, 0)?;
                let rhs = text_arg(operation, args, 1)?;
                Ok(Some(ArgValue::Text(format!("{lhs}{rhs}"))))
            }
            "len" => {
                let value = text_arg(operation, args, 0)?;
                Ok(Some(ArgValue::Int(value.chars().count() as i64)))
            }
            _ => Err(DiscError::new(
                "TEXT_UNKNOWN_OP",
                format!("No text operation \"{operation}\"."),
            )),
        }
    }
}

/// Prints to stdout under the name `log`.
pub struct Log;

impl Capability for Log {
    fn type_name(&self) -> &str {
        "log"
    }

    fn operations(&self) -> Vec<OperationSpec> {
        vec![OperationSpec::new("print", vec![ParamType::Text])]
    }

    fn invoke(
        &mut self,
        operation: &str,
        args: &[ArgValue],
    ) -> Result<Option<ArgValue>, DiscError> {
        match operation {
            "print" => {
                let line = args.first().map(ToString::to_string).unwrap_or_default();
                println!("{line}");
                Ok(None)
            }
            _ => Err(DiscError::new(
                "LOG_UNKNOWN_OP",
                format!("No log operation \"{operation}\"."),
            )),
        }
    }
}

fn int_pair(operation: &str, args: &[ArgValue]) -> Result<(i64, i64), DiscError> {
    let lhs = args.first().and_then(ArgValue::as_int).ok_or_else(|| {
        DiscError::new("MATH_BAD_ARG", format!("{operation} expects an int lhs."))
    })?;
    let rhs = args.get(1).and_then(ArgValue::as_int).ok_or_else(|| {
        DiscError::new("MATH_BAD_ARG", format!("{operation} expects an int rhs."))
    })?;
    Ok((lhs, rhs))
}

fn float_arg(operation: &str, args: &[ArgValue], position: usize) -> Result<f64, DiscError> {
    args.get(position).and_then(ArgValue::as_float).ok_or_else(|| {
        DiscError::new(
            "MATH_BAD_ARG",
            format!("{operation} expects a float at position {position}."),
        )
    })
}

fn text_arg<'a>(
    operation: &str,
    args: &'a [ArgValue],
    position: usize,
) -> Result<&'a str, DiscError> {
    args.get(position).and_then(ArgValue::as_text).ok_or_else(|| {
        DiscError::new(
            "TEXT_BAD_ARG",
            format!("{operation} expects text at position {position}."),
        )
    })
}
