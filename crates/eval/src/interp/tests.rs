use super::*;
use crate::sink::BufferSink;
use tycat_core::{parse, parse_expression};

fn run(src: &str) -> (Interpreter, BufferSink, Result<(), EvalError>) {
    let sink = BufferSink::new();
    let mut interp = Interpreter::new(Box::new(sink.clone()));
    let program = parse(src, "test").unwrap();
    let result = interp.run(&program);
    (interp, sink, result)
}

fn eval_after(src: &str, expr: &str) -> Result<Value, EvalError> {
    let (mut interp, _, result) = run(src);
    result.unwrap();
    interp.eval_expression(&parse_expression(expr, "expr").unwrap())
}

#[test]
fn template_uses_value_at_substitution_time() {
    let v = eval_after(
        "let age: number = 56; let q = `I'm not old, I'm only ${age}`; age = 57;",
        "q",
    )
    .unwrap();
    assert_eq!(v.inspect(), "I'm not old, I'm only 56");
}

#[test]
fn enum_reverse_lookup_alerts_member_name() {
    let (interp, sink, result) = run(
        r#"
        enum Size { Small = 1, Medium, Large }
        let sizeName: string = Size[2];
        alert(sizeName);
        "#,
    );
    result.unwrap();
    assert_eq!(sink.texts(), vec!["Medium"]);
    assert_eq!(sink.take()[0].channel, crate::sink::Channel::Alert);
    assert_eq!(interp.global("sizeName").unwrap().inspect(), "Medium");
}

#[test]
fn enum_values_and_missing_members() {
    let src = "enum Size { Small = 1, Medium, Large }";
    assert_eq!(eval_after(src, "Size[3]").unwrap().inspect(), "Large");
    assert_eq!(eval_after(src, "Size.Medium").unwrap().inspect(), "2");
    assert_eq!(eval_after(src, "Size[\"Small\"]").unwrap().inspect(), "1");
    assert_eq!(eval_after(src, "Size[9]").unwrap().inspect(), "undefined");
    assert_eq!(
        eval_after(src, "Size").unwrap().inspect(),
        "{ '1': 'Small', '2': 'Medium', '3': 'Large', Small: 1, Medium: 2, Large: 3 }"
    );
}

#[test]
fn void_function_runs_side_effect_and_yields_undefined() {
    let (mut interp, sink, result) =
        run("let sing = (): void => console.log(\"Lalalala\"); sing();");
    result.unwrap();
    assert_eq!(sink.texts(), vec!["Lalalala"]);
    let v = interp
        .eval_expression(&parse_expression("sing()", "expr").unwrap())
        .unwrap();
    assert!(matches!(v, Value::Undefined));
}

#[test]
fn never_function_throws_blah() {
    let err = eval_after(
        "let error = (): never => { throw Error(\"blah!\"); };",
        "error()",
    )
    .unwrap_err();
    assert_eq!(
        err,
        EvalError::Thrown {
            message: "blah!".into()
        }
    );
}

#[test]
fn unbounded_loop_hits_step_limit() {
    let sink = BufferSink::new();
    let mut interp = Interpreter::new(Box::new(sink)).with_step_limit(500);
    let program = parse("let spin = (): never => { while (true) {} }; spin();", "test").unwrap();
    assert_eq!(
        interp.run(&program).unwrap_err(),
        EvalError::Diverged { limit: 500 }
    );
}

#[test]
fn runaway_recursion_is_bounded() {
    let err = eval_after("let f = (): number => f();", "f()").unwrap_err();
    assert!(matches!(err, EvalError::CallDepth { .. }));
}

#[test]
fn assertion_is_not_validated() {
    let src = r#"
        let ohhithere: any = "OH HI THERE";
        let strLength: number = (ohhithere as string).length;
        let notAString: any = 42;
        let bogus: number = (notAString as string).length;
        let nothing: any = undefined;
    "#;
    assert_eq!(eval_after(src, "strLength").unwrap().inspect(), "11");
    assert_eq!(eval_after(src, "bogus").unwrap().inspect(), "undefined");
    let err = eval_after(src, "(nothing as string).length").unwrap_err();
    assert!(matches!(err, EvalError::TypeError { .. }));
    let err = eval_after(src, "(notAString as any)()").unwrap_err();
    assert_eq!(err, EvalError::NotCallable { what: "42".into() });
}

#[test]
fn class_greets_through_private_field() {
    let src = r#"
        class Animal {
          private sing: string;
          constructor(sound: string) {
            this.sing = sound;
          }
          greet() {
            return "Hello, " + this.sing;
          }
        }
        let lion = new Animal("Lion");
    "#;
    assert_eq!(eval_after(src, "lion.greet()").unwrap().inspect(), "Hello, Lion");
    assert_eq!(eval_after(src, "lion").unwrap().inspect(), "Animal { sing: 'Lion' }");
    let err = eval_after(src, "Animal(\"x\")").unwrap_err();
    assert!(matches!(err, EvalError::TypeError { .. }));
}

#[test]
fn field_initializers_run_before_constructor() {
    let src = r#"
        class Counter {
          count: number = 1;
          constructor() {
            this.count = this.count + 1;
          }
        }
        let c = new Counter();
    "#;
    assert_eq!(eval_after(src, "c.count").unwrap().inspect(), "2");
}

#[test]
fn methods_see_globals() {
    let (_, sink, result) = run(
        r#"
        class Speaker {
          say(word: string) {
            console.log("said", word);
          }
        }
        new Speaker().say("hi");
        "#,
    );
    result.unwrap();
    assert_eq!(sink.texts(), vec!["said hi"]);
}

#[test]
fn union_variable_holds_either_member() {
    let src = r#"let confused: string | number = "hello"; confused = 42;"#;
    assert_eq!(eval_after(src, "confused").unwrap().inspect(), "42");
    assert_eq!(eval_after(src, "typeof confused").unwrap().inspect(), "number");
}

#[test]
fn narrowing_branches_at_runtime() {
    let src = r#"
        let describe = (value: string | number): string => {
          if (typeof value === "string") {
            return "text of length " + value.length;
          }
          return "number " + value;
        };
    "#;
    assert_eq!(eval_after(src, "describe(\"abc\")").unwrap().inspect(), "text of length 3");
    assert_eq!(eval_after(src, "describe(7)").unwrap().inspect(), "number 7");
}

#[test]
fn while_with_break_and_arrays() {
    let src = r#"
        let xs: number[] = [];
        let i = 0;
        while (true) {
          if (i === 3) { break; }
          xs.push(i);
          i = i + 1;
        }
    "#;
    assert_eq!(eval_after(src, "xs").unwrap().inspect(), "[ 0, 1, 2 ]");
    assert_eq!(eval_after(src, "xs.join(\"-\")").unwrap().inspect(), "0-1-2");
}

#[test]
fn null_and_undefined_are_distinct() {
    let src = "let meh: undefined = undefined; let noo: null = null;";
    assert_eq!(eval_after(src, "meh === noo").unwrap().inspect(), "false");
    assert_eq!(eval_after(src, "typeof noo").unwrap().inspect(), "object");
}

#[test]
fn index_writes_far_past_the_end_are_errors() {
    for index in ["99999999999999999999999", "4000000000"] {
        let (mut interp, _, result) = run("let a: number[] = [1];");
        result.unwrap();
        let program = parse(&format!("a[{}] = 1;", index), "test").unwrap();
        let err = interp.run(&program).unwrap_err();
        assert!(
            matches!(&err, EvalError::TypeError { message } if message.contains("out of range")),
            "{:?}",
            err
        );
        let len = interp
            .eval_expression(&parse_expression("a.length", "expr").unwrap())
            .unwrap();
        assert_eq!(len.inspect(), "1");
    }
}

#[test]
fn index_writes_just_past_the_end_grow_the_array() {
    let src = "let a: number[] = [1]; a[3] = 4;";
    assert_eq!(
        eval_after(src, "a").unwrap().inspect(),
        "[ 1, undefined, undefined, 4 ]"
    );
}

#[test]
fn dropping_the_interpreter_frees_self_referencing_closures() {
    let (interp, _, result) = run("let f = (n: number): number => f(n);");
    result.unwrap();
    let globals = Rc::downgrade(&interp.globals.0);
    drop(interp);
    assert!(globals.upgrade().is_none());
}

#[test]
fn template_substitution_may_contain_a_quoted_brace() {
    let v = eval_after("let s = `${\"}\"}{`;", "s").unwrap();
    assert_eq!(v.inspect(), "}{");
}
