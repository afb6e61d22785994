//! Index operator and map containment
//!
//! `m["k"] == "v"` over a typed map is rewritten to a jsonb containment
//! test so Postgres can use a GIN index on the column. Other index
//! expressions render as JSON accessors.

use serde_json::{Map, Value};

use crate::expr::Expr;

use super::errors::TranslateResult;
use super::interpreter::{push_quoted, Interpreter};
use super::operators;
use super::select::push_accessors;

impl Interpreter<'_> {
    /// Returns true if `index_side == const_side` can be expressed as
    /// containment: an index with a string key over a non-dyn base, compared
    /// against a string constant.
    pub(super) fn is_containment(&self, index_side: &Expr, const_side: &Expr) -> bool {
        let Some((function, _, args)) = index_side.as_call() else {
            return false;
        };
        if !operators::is_index(function) || args.len() != 2 {
            return false;
        }
        let (base, key) = (&args[0], &args[1]);

        !self.checked.is_dyn(base.id)
            && self.string_constant(key).is_some()
            && self.string_constant(const_side).is_some()
    }

    /// `base @> '{"key":"value"}'::jsonb`
    pub(super) fn interpret_containment(
        &self,
        index_side: &Expr,
        const_side: &Expr,
        out: &mut String,
    ) -> TranslateResult<()> {
        let (_, _, args) = index_side
            .as_call()
            .ok_or_else(|| self.unsupported(index_side.id, "containment"))?;
        let base = self.arg(index_side.id, args, 0)?;
        let key = self.arg(index_side.id, args, 1)?;

        let (Some(key), Some(value)) = (self.string_constant(key), self.string_constant(const_side))
        else {
            return Err(self.unsupported(index_side.id, "containment"));
        };

        let mut document = Map::new();
        document.insert(key.to_string(), Value::String(value.to_string()));

        self.interpret_expr(base, out)?;
        out.push_str(" @> ");
        push_quoted(out, &Value::Object(document).to_string());
        out.push_str("::jsonb");
        Ok(())
    }

    /// `base[key]` outside of a containment comparison
    pub(super) fn interpret_index(&self, id: i64, args: &[Expr], out: &mut String) -> TranslateResult<()> {
        let base = self.arg(id, args, 0)?;
        let key = self.arg(id, args, 1)?;
        let key = self
            .string_constant(key)
            .ok_or_else(|| self.unsupported(key.id, "index with a non-string key"))?;

        if base.is_select() || is_index_call(base) {
            return self.interpret_select(base, &[key], out);
        }
        if base.as_ident().is_some() {
            self.interpret_expr(base, out)?;
            push_accessors(out, &[key]);
            return Ok(());
        }
        Err(self.unsupported(id, "index on a computed value"))
    }
}

fn is_index_call(expr: &Expr) -> bool {
    expr.as_call()
        .map(|(function, _, _)| operators::is_index(function))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use crate::expr::{Environment, ExprBuilder};
    use crate::translate::translate;

    #[test]
    fn test_containment_both_orders() {
        let env = Environment::results();

        let b = ExprBuilder::new(&env);
        let idx = b.index(b.ident("annotations"), b.string("repo"));
        let root = b.eq(idx, b.string("tektoncd/results"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            r#"annotations @> '{"repo":"tektoncd/results"}'::jsonb"#
        );

        let b = ExprBuilder::new(&env);
        let idx = b.index(b.ident("annotations"), b.string("repo"));
        let root = b.eq(b.string("tektoncd/results"), idx);
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            r#"annotations @> '{"repo":"tektoncd/results"}'::jsonb"#
        );
    }

    #[test]
    fn test_containment_on_summary_annotations() {
        let env = Environment::results();
        let b = ExprBuilder::new(&env);
        let annotations = b.select(b.ident("summary"), "annotations");
        let root = b.eq(b.index(annotations, b.string("branch")), b.string("main"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            r#"recordsummary_annotations @> '{"branch":"main"}'::jsonb"#
        );
    }

    #[test]
    fn test_containment_with_constant_reference() {
        let env = Environment::results();
        let b = ExprBuilder::new(&env);
        let idx = b.index(b.ident("annotations"), b.string("kind"));
        let root = b.eq(idx, b.ident("PIPELINE_RUN"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            r#"annotations @> '{"kind":"tekton.dev/v1beta1.PipelineRun"}'::jsonb"#
        );
    }

    #[test]
    fn test_containment_escapes_quotes() {
        let env = Environment::results();
        let b = ExprBuilder::new(&env);
        let idx = b.index(b.ident("annotations"), b.string("owner"));
        let root = b.eq(idx, b.string("o'brien"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            r#"annotations @> '{"owner":"o''brien"}'::jsonb"#
        );
    }

    #[test]
    fn test_dyn_index_is_not_containment() {
        let env = Environment::records();
        let b = ExprBuilder::new(&env);
        let labels = b.select(b.select(b.ident("data"), "metadata"), "labels");
        let root = b.eq(b.index(labels, b.string("foo")), b.string("bar"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(data->'metadata'->'labels'->>'foo') = 'bar'"
        );
    }

    #[test]
    fn test_chained_index_is_json_path() {
        let env = Environment::records();

        let b = ExprBuilder::new(&env);
        let labels = b.index(b.index(b.ident("data"), b.string("metadata")), b.string("labels"));
        let root = b.eq(b.index(labels, b.string("app")), b.string("web"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(data->'metadata'->'labels'->>'app') = 'web'"
        );

        let b = ExprBuilder::new(&env);
        let metadata = b.index(b.ident("data"), b.string("metadata"));
        let root = b.eq(b.select(metadata, "name"), b.string("foo"));
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "(data->'metadata'->>'name') = 'foo'"
        );
    }

    #[test]
    fn test_index_in_function_target() {
        let env = Environment::results();
        let b = ExprBuilder::new(&env);
        let idx = b.index(b.ident("annotations"), b.string("repo"));
        let root = b.member(idx, "startsWith", vec![b.string("tektoncd")]);
        assert_eq!(
            translate(&b.build(root)).unwrap(),
            "annotations->>'repo' LIKE 'tektoncd' || '%'"
        );
    }

    #[test]
    fn test_non_string_key_rejected() {
        let env = Environment::results();
        let b = ExprBuilder::new(&env);
        let idx = b.index(b.ident("annotations"), b.int(0));
        let root = b.member(idx, "startsWith", vec![b.string("x")]);
        let err = translate(&b.build(root)).unwrap_err();
        assert!(err.to_string().contains("non-string key"));
    }
}
