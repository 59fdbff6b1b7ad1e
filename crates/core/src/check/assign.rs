//! Assignability between resolved types.

use super::env::TypeEnv;
use crate::ast::Visibility;
use crate::types::{FnType, Shape, Type};

impl TypeEnv {
    /// Whether a value of type `src` may be stored where `dst` is expected.
    pub fn assignable(&self, src: &Type, dst: &Type) -> bool {
        match (src, dst) {
            (_, Type::Any) | (Type::Any, _) | (Type::Never, _) => true,
            (Type::Union(ms), _) => ms.iter().all(|m| self.assignable(m, dst)),
            (_, Type::Union(ms)) => ms.iter().any(|m| self.assignable(src, m)),
            (Type::Undefined, Type::Void) => true,
            (Type::Enum(a), Type::Enum(b)) => a == b,
            (Type::Enum(e), Type::Number) => self.enum_table(e).is_some_and(|t| t.is_numeric()),
            (Type::Enum(e), Type::String) => self
                .enum_table(e)
                .is_some_and(|t| !t.has_numeric_member()),
            (Type::Number, Type::Enum(e)) => self.enum_table(e).is_some_and(|t| t.is_numeric()),
            (Type::Array(a), Type::Array(b)) => self.assignable(a, b),
            (Type::Tuple(ts), Type::Array(b)) => ts.iter().all(|t| self.assignable(t, b)),
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.assignable(x, y))
            }
            (Type::Object(s), Type::Object(t)) => self.missing_or_mismatched(s, t).is_none(),
            (Type::Class(c), Type::Object(t)) => match self.class(c) {
                Some(info) => self
                    .missing_or_mismatched(&info.public_shape(), t)
                    .is_none(),
                None => false,
            },
            (Type::Object(s), Type::Class(c)) => match self.class(c) {
                // Private members make a class nominal.
                Some(info) if !info.has_private_members() => self
                    .missing_or_mismatched(s, &info.public_shape())
                    .is_none(),
                _ => false,
            },
            (Type::Function(f), Type::Function(g)) => self.fn_assignable(f, g),
            // `{}` accepts every non-nullish value
            (s, Type::Object(t)) if t.fields.is_empty() => {
                !matches!(s, Type::Null | Type::Undefined | Type::Void)
            }
            (a, b) => a == b,
        }
    }

    /// Whether values of `a` and `b` can ever be equal (used for `===`,
    /// assertions and narrowing).
    pub fn overlaps(&self, a: &Type, b: &Type) -> bool {
        self.assignable(a, b) || self.assignable(b, a)
    }

    /// First property of `target` that `source` lacks or types incompatibly.
    pub fn missing_or_mismatched(&self, source: &Shape, target: &Shape) -> Option<String> {
        for (name, tf) in &target.fields {
            match source.fields.get(name) {
                Some(sf) => {
                    if sf.optional && !tf.optional {
                        return Some(name.clone());
                    }
                    if !self.assignable(&sf.ty, &tf.ty) {
                        return Some(name.clone());
                    }
                }
                None if tf.optional => {}
                None => return Some(name.clone()),
            }
        }
        None
    }

    fn fn_assignable(&self, f: &FnType, g: &FnType) -> bool {
        // The source may ignore trailing arguments but must not require
        // more than the target supplies.
        if g.rest.is_none() && f.required > g.params.len() {
            return false;
        }
        let params_ok = f
            .params
            .iter()
            .zip(&g.params)
            .all(|(fp, gp)| self.assignable(gp, fp));
        params_ok && (*g.ret == Type::Void || self.assignable(&f.ret, &g.ret))
    }

    /// A one-line explanation of why `src` does not fit `dst`.
    pub fn mismatch_message(&self, src: &Type, dst: &Type) -> String {
        let base = format!("type '{}' is not assignable to type '{}'", src, dst);
        let shapes = match (src, dst) {
            (Type::Object(s), Type::Object(t)) => Some((s.clone(), t.clone())),
            (Type::Class(c), Type::Object(t)) => {
                self.class(c).map(|i| (i.public_shape(), t.clone()))
            }
            _ => None,
        };
        if let Some((s, t)) = shapes {
            if let Some(prop) = self.missing_or_mismatched(&s, &t) {
                if s.fields.contains_key(&prop) {
                    return format!("{}: types of property '{}' are incompatible", base, prop);
                }
                if let Type::Class(c) = src {
                    let private = self
                        .class(c)
                        .and_then(|i| i.member(&prop))
                        .is_some_and(|m| m.visibility == Visibility::Private);
                    if private {
                        return format!(
                            "{}: property '{}' is private in type '{}'",
                            base, prop, c
                        );
                    }
                }
                return format!(
                    "property '{}' is missing in type '{}' but required in type '{}'",
                    prop, src, dst
                );
            }
        }
        if let (Type::Tuple(a), Type::Tuple(b)) = (src, dst) {
            if a.len() != b.len() {
                return format!(
                    "{}: source has {} element(s) but target requires {}",
                    base,
                    a.len(),
                    b.len()
                );
            }
        }
        base
    }
}
