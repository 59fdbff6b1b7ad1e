use super::*;

fn accept(src: &str) -> Checker {
    match check_source(src, "test") {
        Ok((_, c)) => c,
        Err(d) => panic!("expected acceptance, got:\n{}", d),
    }
}

fn reject(src: &str) -> Diagnostics {
    match check_source(src, "test") {
        Ok(_) => panic!("expected rejection of:\n{}", src),
        Err(d) => d,
    }
}

fn assert_rejects(src: &str, needle: &str) {
    let d = reject(src);
    assert!(d.mentions(needle), "expected '{}' in:\n{}", needle, d);
}

#[test]
fn primitive_declarations() {
    accept(
        r#"
        let isCool: boolean = false;
        let age: number = 56;
        let eyeColor: string = "brown";
        let meh: undefined = undefined;
        let noo: null = null;
        "#,
    );
    assert_rejects("let age: number = \"56\";", "not assignable to type 'number'");
    assert_rejects("let meh: undefined = null;", "type 'null' is not assignable to type 'undefined'");
    assert_rejects("let noo: null = undefined;", "type 'undefined' is not assignable to type 'null'");
}

#[test]
fn template_is_a_string() {
    let c = accept("let age = 56; let q = `I'm only ${age}`;");
    assert_eq!(c.type_of_name("q"), Some(&Type::String));
}

#[test]
fn tuple_arity_and_positions() {
    accept("let basket: [string, number]; basket = [\"basketball\", 10];");
    assert_rejects(
        "let basket: [string, number]; basket = [\"basketball\", 10, 5];",
        "source has 3 element(s) but target requires 2",
    );
    assert_rejects(
        "let basket: [string, number]; basket = [10, \"basketball\"];",
        "type 'number' is not assignable to type 'string'",
    );
}

#[test]
fn array_spellings_are_interchangeable() {
    accept(
        r#"
        let pets: string[] = ["cat", "mouse", "dragon"];
        let pets2: Array<string> = ["pig", "lion", "dragon"];
        pets = pets2;
        pets2 = pets;
        "#,
    );
    assert_rejects("let pets: string[] = [\"cat\", 3];", "not assignable to type 'string'");
}

#[test]
fn enum_lookups_in_both_directions() {
    let c = accept(
        r#"
        enum Size { Small = 1, Medium, Large }
        let sizeName: string = Size[2];
        let small: Size = Size.Small;
        let byName: Size = Size["Large"];
        let n: number = Size.Medium;
        "#,
    );
    assert_eq!(c.type_of_name("small"), Some(&Type::Enum("Size".into())));
    assert_rejects(
        "enum Size { Small = 1 } let s: Size = Size.Huge;",
        "property 'Huge' does not exist on type 'typeof Size'",
    );
    assert_rejects(
        "enum Size { Small = 1 } Size.Small = 3;",
        "read-only property",
    );
}

#[test]
fn any_disables_checking() {
    accept(
        r#"
        let whatever: any = "aaaaghhhhhh noooooo!";
        whatever = 3;
        let n: number = whatever.length.foo;
        whatever();
        "#,
    );
}

#[test]
fn void_results_are_not_values() {
    let c = accept("let sing = (): void => console.log(\"Lalalala\");");
    assert_eq!(
        c.type_of_name("sing"),
        Some(&Type::Function(FnType::new(vec![], Type::Void)))
    );
    assert_rejects(
        "let sing = (): void => console.log(\"x\"); let s: string = sing();",
        "type 'void' is not assignable to type 'string'",
    );
    assert_rejects("let f = (): void => 3;", "type 'number' is not assignable to type 'void'");
}

#[test]
fn never_functions_must_not_complete() {
    let c = accept(
        r#"
        let error = (): never => {
          throw Error("blah!");
        };
        let spin = (): never => {
          while (true) {}
        };
        let s: string = error();
        "#,
    );
    assert_eq!(
        c.type_of_name("error"),
        Some(&Type::Function(FnType::new(vec![], Type::Never)))
    );
    assert_rejects(
        "let bad = (): never => { console.log(\"x\"); };",
        "cannot have a reachable end point",
    );
    assert_rejects(
        "let bad = (): never => { while (true) { break; } };",
        "cannot have a reachable end point",
    );
    assert_rejects("let bad = (): never => { return; };", "cannot return");
}

#[test]
fn unannotated_throwing_function_infers_never() {
    let c = accept("let fail = () => { throw Error(\"x\"); };");
    assert_eq!(
        c.type_of_name("fail"),
        Some(&Type::Function(FnType::new(vec![], Type::Never)))
    );
}

#[test]
fn assertions_require_overlap() {
    accept(
        r#"
        let ohhithere: any = "OH HI THERE";
        let strLength: number = (ohhithere as string).length;
        "#,
    );
    assert_rejects(
        "let n: number = 3; let s = n as string;",
        "neither type sufficiently overlaps",
    );
}

#[test]
fn interface_and_inline_shape_accept_the_same_values() {
    let prelude = r#"
        interface RobotArmy { count: number; type: string; magic?: string; }
        let fight = (robots: RobotArmy) => { console.log("FIGHT!"); };
        let fight2 = (robots: { count: number; type: string; magic?: string }) => {
          console.log("FIGHT!");
        };
    "#;
    accept(&format!(
        "{}fight({{ count: 1, type: \"dragon\" }}); fight2({{ count: 1, type: \"dragon\", magic: \"fire\" }}); fight = fight2;",
        prelude
    ));
    assert_rejects(
        &format!("{}fight({{ type: \"dragon\" }});", prelude),
        "property 'count' is missing",
    );
    assert_rejects(
        &format!("{}fight2({{ type: \"dragon\" }});", prelude),
        "property 'count' is missing",
    );
    assert_rejects(
        &format!("{}fight({{ count: 1, type: \"x\", laser: true }});", prelude),
        "'laser' does not exist in type 'RobotArmy'",
    );
}

#[test]
fn optional_field_reads_include_undefined() {
    let c = accept(
        r#"
        interface RobotArmy { count: number; type: string; magic?: string; }
        let r: RobotArmy = { count: 1, type: "t" };
        let m = r.magic;
        "#,
    );
    assert_eq!(
        c.type_of_name("m"),
        Some(&Type::union(vec![Type::String, Type::Undefined]))
    );
}

const ANIMAL: &str = r#"
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

#[test]
fn private_field_visible_only_inside_class() {
    let c = accept(&format!("{}let g: string = lion.greet();", ANIMAL));
    assert_eq!(c.type_of_name("lion"), Some(&Type::Class("Animal".into())));
    assert_rejects(
        &format!("{}let s = lion.sing;", ANIMAL),
        "property 'sing' is private and only accessible within class 'Animal'",
    );
    assert_rejects(
        &format!("{}lion.sing = \"roar\";", ANIMAL),
        "is private",
    );
}

#[test]
fn class_with_private_member_is_nominal() {
    assert_rejects(
        &format!("{}let fake: Animal = {{ sing: \"x\", greet: () => \"hi\" }};", ANIMAL),
        "not assignable",
    );
}

#[test]
fn class_construction_rules() {
    assert_rejects(
        &format!("{}let a = Animal(\"x\");", ANIMAL),
        "did you mean to include 'new'?",
    );
    assert_rejects(
        &format!("{}let a = new Animal();", ANIMAL),
        "expected 1 argument(s), but got 0",
    );
    assert_rejects(
        "class P { name: string; constructor() {} }",
        "'name' has no initializer",
    );
    accept("class P { name: string = \"x\"; tag?: string; }");
}

#[test]
fn inference_widens_literals() {
    let c = accept("let x = 3;");
    assert_eq!(c.type_of_name("x"), Some(&Type::Number));
    assert_rejects("let x = 3; x = \"three\";", "type 'string' is not assignable to type 'number'");
}

#[test]
fn union_accepts_each_member_in_any_order() {
    accept(
        r#"
        let confused: string | number = "hello";
        confused = 42;
        confused = "again";
        "#,
    );
    assert_rejects(
        "let confused: string | number = true;",
        "type 'boolean' is not assignable to type 'string | number'",
    );
}

#[test]
fn union_members_restrict_operations_until_narrowed() {
    assert_rejects(
        "let c: string | number = \"x\"; let n = c.length;",
        "property 'length' does not exist on type 'string | number'",
    );
    let c = accept(
        r#"
        let c: string | number = "x";
        let n: number = 0;
        if (typeof c === "string") {
          n = c.length;
        } else {
          n = c;
        }
        "#,
    );
    assert_eq!(
        c.type_of_name("c"),
        Some(&Type::union(vec![Type::String, Type::Number]))
    );
}

#[test]
fn nullish_narrowing() {
    accept(
        r#"
        let m: string | undefined = undefined;
        let n: number = 0;
        if (m !== undefined) {
          n = m.length;
        }
        "#,
    );
    assert_rejects(
        "let m: string | undefined = undefined; let n = m.length;",
        "object is possibly 'undefined'",
    );
}

#[test]
fn constants_and_statement_placement() {
    assert_rejects("const k = 1; k = 2;", "because it is a constant");
    assert_rejects("return 3;", "can only be used within a function body");
    assert_rejects("break;", "within an enclosing loop");
    assert_rejects("let a = 1; let a = 2;", "cannot redeclare");
}

#[test]
fn every_diagnostic_is_collected() {
    let d = reject("let a: number = \"x\"; let b: string = 1; let c = missing;");
    assert_eq!(d.len(), 3);
    assert!(d.iter().all(|x| x.phase == crate::error::Phase::Check));
    assert_eq!(d.0[2].line, 1);
}

#[test]
fn declarations_persist_across_programs() {
    let mut c = Checker::new("first");
    c.check_program(&parser::parse("let age: number = 56;", "first").unwrap())
        .unwrap();
    c.set_file("second");
    let p = parser::parse("let q: string = `${age}`; let n: number = age;", "second").unwrap();
    c.check_program(&p).unwrap();

    let bad = parser::parse("age = \"x\";", "third").unwrap();
    let mut scratch = c.clone();
    scratch.set_file("third");
    let d = scratch.check_program(&bad).unwrap_err();
    assert_eq!(d.0[0].file, "third");
}

#[test]
fn expression_typing_against_declarations() {
    let mut c = accept("enum Size { Small = 1, Medium, Large }");
    let e = parser::parse_expression("Size[2]", "expr").unwrap();
    assert_eq!(c.check_expression(&e).unwrap(), Type::String);
}

#[test]
fn string_enum_rules() {
    assert_rejects(
        "enum Color { Red = \"RED\", Green }",
        "'Color.Green' must have an initializer",
    );
    accept("enum Color { Red = \"RED\" } let s: string = Color.Red;");
}

#[test]
fn literals_try_every_union_member() {
    accept("let v: string[] | number[] = [1, 2];");
    accept("let w: { a: number } | { b: string } = { b: \"x\" };");
    accept("let t: [string] | [number] = [1];");
    assert_rejects(
        "let v: string[] | number[] = [true];",
        "type 'boolean[]' is not assignable",
    );
    let d = reject("let w: { a: number } | { b: string } = { c: 1 };");
    assert_eq!(d.len(), 1);
}

#[test]
fn failed_union_members_leave_no_diagnostics() {
    let d = reject("let t: [string] | [number] = [1]; let n: number = \"x\";");
    assert_eq!(d.len(), 1);
    assert!(d.mentions("type 'string' is not assignable to type 'number'"));
}

#[test]
fn branch_may_shadow_a_narrowed_name() {
    accept(
        r#"
        let v: string | number = 1;
        if (typeof v === "string") { let v = 2; } else { let v = "y"; }
        "#,
    );
    assert_rejects(
        "let v: string | number = 1; if (typeof v === \"string\") { let x = 1; let x = 2; }",
        "cannot redeclare block-scoped variable 'x'",
    );
}

#[test]
fn annotated_arrow_sees_its_own_binding() {
    let c = accept(
        r#"
        let countdown = (n: number): number => {
            if (n === 0) { return 0; }
            return countdown(n - 1);
        };
        let echo: (n: number) => number = (n) => echo(n);
        "#,
    );
    assert_eq!(
        c.type_of_name("countdown"),
        Some(&Type::Function(FnType::new(vec![Type::Number], Type::Number)))
    );
    assert_rejects("let f = (n) => f(n);", "cannot find name 'f'");
    assert_rejects(
        "let a = 1; let a = (n: number): number => n;",
        "cannot redeclare block-scoped variable 'a'",
    );
}
