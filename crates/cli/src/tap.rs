use std::fmt::Write as _;

/// TAP (Test Anything Protocol) v14 report, one test point per entry.
#[derive(Default)]
pub struct Tap {
    points: Vec<Point>,
}

struct Point {
    ok: bool,
    desc: String,
    /// Printed as `# ` lines under the test point.
    notes: Vec<String>,
}

impl Tap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&mut self, desc: impl Into<String>, notes: Vec<String>) {
        self.points.push(Point {
            ok: true,
            desc: desc.into(),
            notes,
        });
    }

    pub fn not_ok(&mut self, desc: impl Into<String>, notes: Vec<String>) {
        self.points.push(Point {
            ok: false,
            desc: desc.into(),
            notes,
        });
    }

    pub fn failure_count(&self) -> usize {
        self.points.iter().filter(|p| !p.ok).count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "TAP version 14");
        let _ = writeln!(out, "1..{}", self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            let status = if p.ok { "ok" } else { "not ok" };
            let _ = writeln!(out, "{} {} - {}", status, i + 1, p.desc);
            for note in &p.notes {
                for line in note.lines() {
                    let _ = writeln!(out, "  # {}", line);
                }
            }
        }
        let failed = self.failure_count();
        let _ = writeln!(out, "# tests {}", self.points.len());
        let _ = writeln!(out, "# pass  {}", self.points.len() - failed);
        let _ = writeln!(out, "# fail  {}", failed);
        out
    }

    /// Print the report to stdout.
    pub fn finish(self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_points_notes_and_summary() {
        let mut tap = Tap::new();
        tap.ok("enum", vec!["alert: Medium".into()]);
        tap.not_ok("tuple", vec!["line one\nline two".into()]);
        assert_eq!(tap.failure_count(), 1);
        assert_eq!(
            tap.render(),
            "TAP version 14\n1..2\nok 1 - enum\n  # alert: Medium\nnot ok 2 - tuple\n  # line one\n  # line two\n# tests 2\n# pass  1\n# fail  1\n"
        );
    }

    #[test]
    fn empty_plan() {
        assert!(Tap::new().render().starts_with("TAP version 14\n1..0\n"));
    }
}
