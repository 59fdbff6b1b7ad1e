//! The example catalog: one small program per type-system feature, in the
//! order they build on each other.
//!
//! Accepted entries are checked, committed and evaluated; later entries
//! may use what they declared. Rejected entries are counter-examples: they
//! must fail the checker with a diagnostic containing the given text, and
//! are never evaluated or committed.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Boolean,
    Number,
    String,
    Template,
    Array,
    Tuple,
    Enum,
    Any,
    Void,
    Undefined,
    Null,
    Never,
    Assertion,
    Interface,
    Shape,
    Function,
    Class,
    Inference,
    Union,
    Narrowing,
    Alias,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        f.write_str(&s)
    }
}

/// What evaluating a probe expression must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "text")]
pub enum Outcome {
    /// The value, rendered as `console.log` would.
    Value(&'static str),
    /// An uncaught error carrying this message.
    Throws(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub expr: &'static str,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "expect")]
pub enum Expect {
    Accept { probe: Option<Probe> },
    Reject { diagnostic: &'static str },
}

#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub label: &'static str,
    pub category: Category,
    pub source: &'static str,
    #[serde(flatten)]
    pub expect: Expect,
}

impl Entry {
    pub fn is_accepted(&self) -> bool {
        matches!(self.expect, Expect::Accept { .. })
    }
}

const fn accept(
    label: &'static str,
    category: Category,
    source: &'static str,
    probe: Option<Probe>,
) -> Entry {
    Entry {
        label,
        category,
        source,
        expect: Expect::Accept { probe },
    }
}

const fn reject(
    label: &'static str,
    category: Category,
    source: &'static str,
    diagnostic: &'static str,
) -> Entry {
    Entry {
        label,
        category,
        source,
        expect: Expect::Reject { diagnostic },
    }
}

const fn shows(expr: &'static str, text: &'static str) -> Option<Probe> {
    Some(Probe {
        expr,
        outcome: Outcome::Value(text),
    })
}

const fn throws(expr: &'static str, message: &'static str) -> Option<Probe> {
    Some(Probe {
        expr,
        outcome: Outcome::Throws(message),
    })
}

/// Look up an entry by label.
pub fn find(label: &str) -> Option<&'static Entry> {
    entries().iter().find(|e| e.label == label)
}

/// All entries in evaluation order.
pub fn entries() -> &'static [Entry] {
    use Category::*;
    static ENTRIES: &[Entry] = &[
        accept(
            "boolean",
            Boolean,
            "let isCool: boolean = false;",
            shows("isCool", "false"),
        ),
        reject(
            "boolean-mismatch",
            Boolean,
            "let isWarm: boolean = \"yes\";",
            "type 'string' is not assignable to type 'boolean'",
        ),
        accept("number", Number, "let age: number = 56;", shows("age", "56")),
        accept(
            "string",
            String,
            "let eyeColor: string = \"brown\";",
            shows("eyeColor", "brown"),
        ),
        accept(
            "template",
            Template,
            "let favoriteQuote: string = `I'm not old, I'm only ${age}`;",
            shows("favoriteQuote", "I'm not old, I'm only 56"),
        ),
        accept(
            "array",
            Array,
            "let pets: string[] = [\"cat\", \"mouse\", \"dragon\"];",
            shows("pets", "[ 'cat', 'mouse', 'dragon' ]"),
        ),
        accept(
            "array-generic",
            Array,
            "let pets2: Array<string> = [\"pig\", \"lion\", \"dragon\"];",
            shows("pets2", "[ 'pig', 'lion', 'dragon' ]"),
        ),
        accept(
            "array-interchangeable",
            Array,
            "let morePets: string[] = pets2;\nlet evenMorePets: Array<string> = pets;",
            shows("morePets === pets2", "true"),
        ),
        reject(
            "array-element-mismatch",
            Array,
            "let counts: number[] = [1, \"two\"];",
            "type 'string' is not assignable to type 'number'",
        ),
        accept(
            "tuple",
            Tuple,
            "let basket: [string, number];\nbasket = [\"basketball\", 10];",
            shows("basket", "[ 'basketball', 10 ]"),
        ),
        reject(
            "tuple-overflow",
            Tuple,
            "basket = [\"basketball\", 10, 5];",
            "source has 3 element(s) but target requires 2",
        ),
        reject(
            "tuple-swapped",
            Tuple,
            "basket = [10, \"basketball\"];",
            "type 'number' is not assignable to type 'string'",
        ),
        accept(
            "enum",
            Enum,
            "enum Size {\n  Small = 1,\n  Medium,\n  Large\n}\nlet sizeName: string = Size[2];\nalert(sizeName);",
            shows("sizeName", "Medium"),
        ),
        accept(
            "enum-reverse",
            Enum,
            "let largest: string = Size[3];",
            shows("largest", "Large"),
        ),
        accept(
            "enum-forward",
            Enum,
            "let medium: Size = Size.Medium;\nlet ordinal: number = Size[\"Medium\"];",
            shows("medium", "2"),
        ),
        reject(
            "enum-readonly",
            Enum,
            "Size.Small = 5;",
            "read-only property",
        ),
        accept(
            "any",
            Any,
            "let whatever: any = \"aaaaghhhhhh noooooo!\";\nwhatever = 42;\nwhatever = { anything: \"goes\" };\nlet anyNumber: number = whatever;",
            shows("whatever", "{ anything: 'goes' }"),
        ),
        accept(
            "void",
            Void,
            "let sing = (): void => console.log(\"Lalalala\");\nsing();",
            shows("sing()", "undefined"),
        ),
        reject(
            "void-as-value",
            Void,
            "let lyric: string = sing();",
            "type 'void' is not assignable to type 'string'",
        ),
        accept(
            "undefined",
            Undefined,
            "let meh: undefined = undefined;",
            shows("meh", "undefined"),
        ),
        accept("null", Null, "let noo: null = null;", shows("noo", "null")),
        reject(
            "null-is-not-undefined",
            Undefined,
            "let notMeh: undefined = null;",
            "type 'null' is not assignable to type 'undefined'",
        ),
        reject(
            "undefined-is-not-null",
            Null,
            "let notNoo: null = undefined;",
            "type 'undefined' is not assignable to type 'null'",
        ),
        accept(
            "never",
            Never,
            "let error = (): never => {\n  throw Error(\"blah!\");\n};",
            throws("error()", "blah!"),
        ),
        accept(
            "never-assignable",
            Never,
            "let impossible = (): string => error();",
            throws("impossible()", "blah!"),
        ),
        reject(
            "never-completes",
            Never,
            "let broken = (): never => {\n  console.log(\"done\");\n};",
            "cannot have a reachable end point",
        ),
        accept(
            "assertion",
            Assertion,
            "let ohhithere: any = \"OH HI THERE\";\nlet strLength: number = (ohhithere as string).length;",
            shows("strLength", "11"),
        ),
        accept(
            "assertion-unchecked",
            Assertion,
            "let notAString: any = 42;\nlet bogusLength: number = (notAString as string).length;",
            shows("bogusLength", "undefined"),
        ),
        reject(
            "assertion-no-overlap",
            Assertion,
            "let digits: number = 7;\nlet text = digits as string;",
            "neither type sufficiently overlaps",
        ),
        accept(
            "interface",
            Interface,
            "interface RobotArmy {\n  count: number;\n  type: string;\n  magic?: string; // optional\n}\n\nlet fightRobotArmy = (robots: RobotArmy) => {\n  console.log(\"FIGHT!\");\n};",
            None,
        ),
        accept(
            "optional-field-omitted",
            Interface,
            "let army: RobotArmy = { count: 10, type: \"dragon\" };",
            shows("army.magic", "undefined"),
        ),
        reject(
            "required-field-missing",
            Interface,
            "let halfArmy: RobotArmy = { type: \"dragon\" };",
            "property 'count' is missing",
        ),
        reject(
            "excess-property",
            Interface,
            "let loudArmy: RobotArmy = { count: 1, type: \"dragon\", volume: 11 };",
            "'volume' does not exist in type 'RobotArmy'",
        ),
        accept(
            "inline-shape",
            Shape,
            "let fightRobotArmy2 = (robots: {\n  count: number;\n  type: string;\n  magic?: string;\n}) => {\n  console.log(\"FIGHT!\");\n};\nfightRobotArmy = fightRobotArmy2;\nfightRobotArmy2 = fightRobotArmy;",
            None,
        ),
        reject(
            "inline-shape-field-missing",
            Shape,
            "fightRobotArmy2({ type: \"dragon\", magic: \"fire\" });",
            "property 'count' is missing",
        ),
        accept(
            "function",
            Function,
            "let fightRobotArmyF = (robots: RobotArmy): void => {\n  console.log(\"FIGHT!\");\n};\nlet fightRobotArmy2F = (robots: {\n  count: number;\n  type: string;\n  magic?: string;\n}): void => {\n  console.log(\"FIGHT!\");\n};",
            shows("fightRobotArmyF(army)", "undefined"),
        ),
        accept(
            "class",
            Class,
            "class Animal {\n  private sing: string;\n  constructor(sound: string) {\n    this.sing = sound;\n  }\n  greet() {\n    return \"Hello, \" + this.sing;\n  }\n}\n\nlet lion = new Animal(\"Lion\");",
            shows("lion.greet()", "Hello, Lion"),
        ),
        reject(
            "private-access",
            Class,
            "let secret = lion.sing;",
            "property 'sing' is private and only accessible within class 'Animal'",
        ),
        reject(
            "class-without-new",
            Class,
            "let cub = Animal(\"Cub\");",
            "did you mean to include 'new'?",
        ),
        accept("inference", Inference, "let x = 3;", shows("x", "3")),
        reject(
            "inference-mismatch",
            Inference,
            "x = \"three\";",
            "type 'string' is not assignable to type 'number'",
        ),
        accept(
            "union",
            Union,
            "let confused: string | number = \"hello\";\nconfused = 42;",
            shows("confused", "42"),
        ),
        reject(
            "union-mismatch",
            Union,
            "confused = true;",
            "type 'boolean' is not assignable to type 'string | number'",
        ),
        reject(
            "union-member-access",
            Union,
            "let size = confused.length;",
            "property 'length' does not exist on type 'string | number'",
        ),
        accept(
            "narrowing",
            Narrowing,
            "let describe = (value: string | number): string => {\n  if (typeof value === \"string\") {\n    return \"text of length \" + value.length;\n  }\n  return \"number \" + value;\n};",
            shows("describe(confused)", "number 42"),
        ),
        accept(
            "alias",
            Alias,
            "type Basket = [string, number];\nlet picnic: Basket = [\"apple\", 3];",
            shows("picnic", "[ 'apple', 3 ]"),
        ),
    ];
    ENTRIES
}
