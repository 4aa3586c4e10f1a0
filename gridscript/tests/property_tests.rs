use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use gridscript::command::CommandTable;
use gridscript::script::expr::eval_str;
use gridscript::script::token::tokenize;
use gridscript::script::{Interpreter, Value};
use gridscript::var::Variables;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

/// Table with a single `tick` command; returns how many times it ran.
fn counting_table() -> (CommandTable, Arc<Mutex<usize>>) {
    let count = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&count);
    let mut table = CommandTable::new();
    table.register("tick", move |_args| {
        let sink = Arc::clone(&sink);
        async move {
            *sink.lock().unwrap() += 1;
            Ok(())
        }
    });
    (table, count)
}

fn vars(a: i64, b: i64) -> Variables {
    [("a", a), ("b", b)].into_iter().collect()
}

proptest! {
    /// The tokenizer drops whitespace and nothing else.
    #[test]
    fn tokenizer_keeps_every_non_space_char(s in "[a-z0-9 (),={}+*/!<>%&|-]{0,40}") {
        let joined: String = tokenize(&s).into_iter().map(|t| t.text).collect();
        let expected: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(joined, expected);
    }

    /// `&&` and `||` come out as their own symbols however tightly they
    /// are packed between operands.
    #[test]
    fn logical_operators_always_split(
        operands in prop::collection::vec("[a-z][a-z0-9]{0,3}|[0-9]{1,3}", 2..6),
        ops in prop::collection::vec(prop_oneof![Just("&&"), Just("||")], 5),
    ) {
        let mut line = operands[0].clone();
        let mut expected = vec![operands[0].clone()];
        for (operand, op) in operands[1..].iter().zip(&ops) {
            line.push_str(op);
            line.push_str(operand);
            expected.push(op.to_string());
            expected.push(operand.clone());
        }
        let tokens = tokenize(&line);
        let texts: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
        prop_assert_eq!(texts, expected);
        for t in tokens.iter().filter(|t| t.text == "&&" || t.text == "||") {
            prop_assert!(t.is_symbol(&t.text));
        }
    }

    /// The evaluator returns Ok or Err on arbitrary input but never panics.
    #[test]
    fn evaluator_does_not_panic(s in "\\PC{0,40}") {
        let _ = eval_str(&s, &vars(1, 2));
    }

    /// Small-operand arithmetic agrees with i64.
    #[test]
    fn arithmetic_matches_i64(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        let v = vars(a, b);
        prop_assert_eq!(eval_str("a + b", &v).unwrap(), Value::Int(a + b));
        prop_assert_eq!(eval_str("a - b", &v).unwrap(), Value::Int(a - b));
        prop_assert_eq!(eval_str("a * b", &v).unwrap(), Value::Int(a * b));
        prop_assert_eq!(eval_str("a < b", &v).unwrap(), Value::Bool(a < b));
        prop_assert_eq!(eval_str("a == b", &v).unwrap(), Value::Bool(a == b));
        if b != 0 {
            prop_assert_eq!(eval_str("(a * b) / b", &v).unwrap(), Value::Int(a));
        }
    }

    /// `repeat(N)` issues exactly max(N, 0) commands.
    #[test]
    fn repeat_runs_count_times(n in -5i64..40) {
        let (table, count) = counting_table();
        let res = runtime().block_on(async {
            Interpreter::new(table).run(&format!("repeat({n}) {{ tick() }}")).await
        });
        prop_assert!(res.success);
        prop_assert_eq!(*count.lock().unwrap(), n.max(0) as usize);
    }

    /// Writes to a parameter inside a function never reach the caller.
    #[test]
    fn function_scope_is_isolated(x in any::<i32>(), y in any::<i32>()) {
        let (table, _) = counting_table();
        let src = format!("function f(x) {{ x = {y} }}\nx = {x}\nf({y})");
        let res = runtime().block_on(async { Interpreter::new(table).run(&src).await });
        prop_assert!(res.success, "{:?}", res.error);
        prop_assert_eq!(res.variables.get("x"), Some(x as i64));
    }
}
