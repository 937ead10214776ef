use disc_core::{ArgValue, DiscError, Instruction, InstructionKind, ParamType};

use crate::directory::Directory;
use crate::fault::{Fault, FaultKind, FaultSink};
use crate::heap::Heap;

/// Reserved token marking an argument as the heap key for the call result
/// rather than a call argument.
pub const RETURN_TOKEN: &str = "return";

/// Executes one Command instruction: resolves its arguments against the
/// heap, looks up the target operation, coerces arguments to the declared
/// parameter types, invokes, and stores a designated result back into the
/// heap.
///
/// Coercion failures are reported to `sink` and fall back to the raw text;
/// every other failure aborts only this instruction and leaves the heap
/// unmodified. Returns the call result on success.
pub fn dispatch(
    instruction: &Instruction,
    index: usize,
    directory: &mut Directory,
    heap: &mut Heap,
    sink: &dyn FaultSink,
) -> Result<Option<ArgValue>, Fault> {
    let fault = |kind: FaultKind, error: DiscError| Fault {
        kind,
        index,
        instruction: instruction.to_string(),
        error,
    };

    if instruction.kind() != Some(InstructionKind::Command) {
        return Err(fault(
            FaultKind::Lookup,
            DiscError::new(
                "DISPATCH_NOT_A_COMMAND",
                "Only Command instructions address a registered object.",
            ),
        ));
    }

    let Some((operation_name, call_args)) = instruction.args().split_first() else {
        return Err(fault(
            FaultKind::Lookup,
            DiscError::new("DISPATCH_NO_OPERATION", "Command carries no operation name."),
        ));
    };

    // Split result-key designations from call arguments; the last `return`
    // designation wins. Everything else heap-substitutes on an exact key
    // match, otherwise passes as the trimmed literal.
    let mut resolved: Vec<String> = Vec::with_capacity(call_args.len());
    let mut result_key: Option<String> = None;
    for arg in call_args {
        if arg.contains(RETURN_TOKEN) {
            result_key = Some(parse_result_key(arg));
        } else {
            let trimmed = arg.trim();
            match heap.get(trimmed) {
                Some(value) => resolved.push(value.to_string()),
                None => resolved.push(trimmed.to_string()),
            }
        }
    }

    let target = instruction.target();
    let Some(operation) = directory.resolve_operation(target, operation_name, resolved.len())
    else {
        let error = if directory.contains(target) {
            DiscError::new(
                "DISPATCH_OPERATION_NOT_FOUND",
                format!("No operation \"{operation_name}\" on \"{target}\"."),
            )
        } else {
            DiscError::new(
                "DISPATCH_TARGET_NOT_FOUND",
                format!("Target \"{target}\" is not registered."),
            )
        };
        return Err(fault(FaultKind::Lookup, error));
    };

    let mut coerced = Vec::with_capacity(resolved.len());
    for (position, raw) in resolved.iter().enumerate() {
        let ty = operation.params.get(position).unwrap_or(&ParamType::Text);
        match ArgValue::coerce(raw, ty) {
            Ok(value) => coerced.push(value),
            Err(error) => {
                // Raw-text fallback; the call itself may still reject it.
                sink.report(fault(FaultKind::Coercion, error));
                coerced.push(ArgValue::Text(raw.clone()));
            }
        }
    }

    let Some(handle) = directory.resolve_handle(target) else {
        return Err(fault(
            FaultKind::Lookup,
            DiscError::new(
                "DISPATCH_TARGET_NOT_FOUND",
                format!("Target \"{target}\" is not registered."),
            ),
        ));
    };
    let result = handle
        .invoke(&operation.name, &coerced)
        .map_err(|error| fault(FaultKind::Invocation, error))?;

    if let Some(key) = result_key {
        let Some(value) = result.as_ref() else {
            return Err(fault(
                FaultKind::Invocation,
                DiscError::new(
                    "DISPATCH_NO_RESULT",
                    format!(
                        "Operation \"{}\" produced no value for heap key \"{key}\".",
                        operation.name
                    ),
                ),
            ));
        };
        heap.store(key, value.to_string());
    }

    Ok(result)
}

/// Extracts the heap key from a `return <name>` argument. The reserved
/// prefix is fixed-width; whatever follows it, trimmed, is the key.
fn parse_result_key(arg: &str) -> String {
    let trimmed = arg.trim();
    trimmed
        .get(RETURN_TOKEN.len()..)
        .unwrap_or("")
        .trim()
        .to_string()
}
