//! Structural-matching handler: one `case` arm per rule, in rule order.

use std::collections::BTreeSet;

use tracing::info;

use crate::{
    codegen::{CodeGen, CodeGenError, ErrorStyle, GeneratorConfig, source::Source},
    rule::{Rule, RuleKind, RuleResult},
    rule_set::RuleSet,
    types::{Target, ValueType, format_raw, quote},
};

const TARGET: Target = Target::Scala;
const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arm {
    pub rule: usize,
    /// Extractor pattern over the execution, e.g.
    /// `QueryExecution(rule0(_*), ExecutedParameter("a") :: _)`.
    pub pattern: String,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handler {
    /// Compiled expressions and date values the arms refer to.
    pub declarations: Vec<String>,
    pub detections: Vec<String>,
    pub queries: Vec<Arm>,
    pub updates: Vec<Arm>,
    pub widths: BTreeSet<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ScalaCodeGen {
    config: GeneratorConfig,
}

fn execution(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::Query => "QueryExecution",
        RuleKind::Update => "UpdateExecution",
    }
}

fn tuple(cells: Vec<String>) -> String {
    match cells.len() {
        1 => cells.join(""),
        _ => format!("({})", cells.join(", ")),
    }
}

impl ScalaCodeGen {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn error_body(&self, kind: RuleKind, message: &str) -> String {
        let message = quote(message);
        match (self.config.error_style, kind) {
            (ErrorStyle::Raise, _) => format!("throw new SQLException({message})"),
            (ErrorStyle::Warning, RuleKind::Query) => {
                format!("QueryResult.Nil.withWarning({message})")
            }
            (ErrorStyle::Warning, RuleKind::Update) => {
                format!("UpdateResult.Nothing.withWarning({message})")
            }
        }
    }

    fn arm(&self, index: usize, rule: &Rule, handler: &mut Handler) -> Result<Arm, CodeGenError> {
        let pattern = rule.pattern();
        let regex = format!("rule{index}");
        handler
            .declarations
            .push(format!("val {regex} = {}.r", quote(pattern.expression())));

        let mut parameters = vec![];
        for (position, value) in pattern.parameters().iter().enumerate() {
            let extracted = match value.value_type() {
                // Not a literal pattern, bound to a stable identifier instead.
                ValueType::Date => {
                    let name = format!("rule{index}Param{}", position + 1);
                    handler
                        .declarations
                        .push(format!("val {name} = {}", value.literal(TARGET)));
                    format!("`{name}`")
                }
                ValueType::Text | ValueType::Number => value.literal(TARGET),
            };
            parameters.push(format!("ExecutedParameter({extracted})"));
        }
        parameters.push("_".to_string());

        let body = match rule.result() {
            RuleResult::Error { message } => vec![self.error_body(rule.kind(), message)],
            RuleResult::UpdateCount { count } => vec![format!("new UpdateResult({count})")],
            RuleResult::RowSet(row_set) => {
                let width = self.config.checked_width(index, row_set)?;
                handler.widths.insert(width);
                let columns = row_set
                    .schema()
                    .iter()
                    .map(|column| {
                        format!(
                            "{} -> {}",
                            column.column_type.target_type_name(TARGET),
                            quote(&column.name)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut body = vec![format!("rowList{width}({columns})")];
                for row in row_set.rows() {
                    let cells = row
                        .iter()
                        .zip(row_set.schema())
                        .map(|(cell, column)| format_raw(column.column_type, cell, TARGET))
                        .collect();
                    if let Some(last) = body.last_mut() {
                        last.push_str(" :+");
                    }
                    body.push(format!("  {}", tuple(cells)));
                }
                body
            }
        };

        Ok(Arm {
            rule: index,
            pattern: format!(
                "{}({regex}(_*), {})",
                execution(rule.kind()),
                parameters.join(" :: ")
            ),
            body,
        })
    }

    /// Arms per statement kind, in rule order.
    pub fn build_handler(&self, rules: &RuleSet) -> Result<Handler, CodeGenError> {
        let mut handler = Handler::default();
        for (index, rule) in rules.iter().enumerate() {
            let arm = self.arm(index, rule, &mut handler)?;
            match rule.kind() {
                RuleKind::Query => {
                    handler.detections.push(quote(rule.pattern().expression()));
                    handler.queries.push(arm);
                }
                RuleKind::Update => handler.updates.push(arm),
            }
        }
        Ok(handler)
    }

    fn matcher(arms: &[Arm], unsupported: &str) -> Source {
        let mut cases = Source::new();
        for arm in arms {
            let mut body = Source::new();
            for line in &arm.body {
                body.line(line);
            }
            cases.line(format!("case {} =>", arm.pattern)).indent(body);
        }
        cases.line(format!(
            "case _ => throw new RuntimeException({})",
            quote(unsupported)
        ));

        let mut matcher = Source::new();
        matcher.line("e match {").indent(cases).line("}");
        matcher
    }

    pub fn build(&self, rules: &RuleSet) -> Result<Source, CodeGenError> {
        let handler = self.build_handler(rules)?;
        let handler_id = &self.config.handler_id;

        let mut source = Source::new();
        source
            .line("import java.sql.{ Connection => SqlConnection, DriverManager, SQLException }")
            .line(
                "import acolyte.{ CompositeHandler, Driver => AcolyteDriver, ExecutedParameter, \
                 QueryExecution, QueryResult, UpdateExecution, UpdateResult }",
            );
        if !handler.widths.is_empty() {
            let builders = handler
                .widths
                .iter()
                .map(|width| format!("rowList{width}"))
                .collect::<Vec<_>>()
                .join(", ");
            source.line(format!("import acolyte.RowLists.{{ {builders} }}"));
        }
        source
            .line("import acolyte.Acolyte // DSL")
            .line("import acolyte.Implicits._")
            .blank();
        for line in TARGET.date_format_declaration() {
            source.line(line);
        }
        source.blank();
        if !handler.declarations.is_empty() {
            for declaration in &handler.declarations {
                source.line(declaration);
            }
            source.blank();
        }

        let mut chain = Source::new();
        if !handler.detections.is_empty() {
            chain.line(format!(
                "withQueryDetection({}).",
                handler.detections.join(", ")
            ));
        }
        chain
            .line(format!("withQueryHandler {{ e: {} =>", execution(RuleKind::Query)))
            .indent(Self::matcher(&handler.queries, "Unsupported JDBC query"))
            .line("}.")
            .line(format!("withUpdateHandler {{ e: {} =>", execution(RuleKind::Update)))
            .indent(Self::matcher(&handler.updates, "Unsupported JDBC update"))
            .line("}");

        source
            .line("// Prepare handler")
            .line("val handler: CompositeHandler = Acolyte.handleStatement.")
            .indent(chain)
            .blank()
            .line(format!(
                "// Register prepared handler with expected ID '{handler_id}'"
            ))
            .line(format!("AcolyteDriver.register({}, handler)", quote(handler_id)))
            .blank()
            .line("// then when existing code do ...")
            .line(format!(
                "val con: SqlConnection = DriverManager.getConnection({})",
                quote(&self.config.jdbc_url())
            ));
        Ok(source)
    }
}

impl CodeGen for ScalaCodeGen {
    fn name(&self) -> &'static str {
        "scala"
    }

    fn generate(&self, rules: &RuleSet) -> Result<String, CodeGenError> {
        info!(rules = rules.len(), "generating scala handler");
        Ok(self.build(rules)?.render_with_indent(INDENT))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        rule::{Column, Pattern, RowSet},
        types::Value,
    };

    fn rule(kind: RuleKind, expression: &str, parameters: Vec<Value>, result: RuleResult) -> Rule {
        Rule::new(kind, Pattern::new(expression, parameters).unwrap(), result).unwrap()
    }

    #[test]
    fn arms_destructure_parameters_positionally() {
        let rules: RuleSet = [rule(
            RuleKind::Query,
            "SELECT .* WHERE id = \\d+",
            vec![
                Value::text("a\"b"),
                Value::number("1.5").unwrap(),
                Value::date("2014-03-09").unwrap(),
            ],
            RuleResult::error("nope"),
        )]
        .into_iter()
        .collect();
        let handler = ScalaCodeGen::default().build_handler(&rules).unwrap();
        assert_eq!(
            handler.queries[0].pattern,
            "QueryExecution(rule0(_*), ExecutedParameter(\"a\\\"b\") :: ExecutedParameter(1.5f) \
             :: ExecutedParameter(`rule0Param3`) :: _)"
        );
        assert_eq!(
            handler.declarations,
            vec![
                r#"val rule0 = "SELECT .* WHERE id = \\d+".r"#,
                r#"val rule0Param3 = dateFormat.parse("2014-03-09")"#,
            ]
        );
        assert_eq!(
            handler.queries[0].body,
            vec![r#"throw new SQLException("nope")"#]
        );
    }

    #[test]
    fn unconstrained_arm_accepts_any_parameters() {
        let rules: RuleSet = [rule(
            RuleKind::Update,
            "UPDATE test SET.*",
            vec![],
            RuleResult::update_count(2),
        )]
        .into_iter()
        .collect();
        let code = ScalaCodeGen::default().generate(&rules).unwrap();
        let expected = "\
val handler: CompositeHandler = Acolyte.handleStatement.
  withQueryHandler { e: QueryExecution =>
    e match {
      case _ => throw new RuntimeException(\"Unsupported JDBC query\")
    }
  }.
  withUpdateHandler { e: UpdateExecution =>
    e match {
      case UpdateExecution(rule0(_*), _) =>
        new UpdateResult(2)
      case _ => throw new RuntimeException(\"Unsupported JDBC update\")
    }
  }
";
        assert!(code.contains(expected), "{code}");
    }

    #[test]
    fn arms_keep_rule_order_and_duplicates() {
        let rules: RuleSet = [
            rule(RuleKind::Query, "SELECT.*", vec![], RuleResult::error("broad")),
            rule(RuleKind::Update, "UPDATE.*", vec![], RuleResult::update_count(1)),
            rule(RuleKind::Query, "SELECT 1", vec![], RuleResult::error("narrow")),
            rule(RuleKind::Query, "SELECT.*", vec![], RuleResult::error("broad")),
        ]
        .into_iter()
        .collect();
        let handler = ScalaCodeGen::default().build_handler(&rules).unwrap();
        let order = handler.queries.iter().map(|arm| arm.rule).collect::<Vec<_>>();
        assert_eq!(order, vec![0, 2, 3]);

        let code = ScalaCodeGen::default().generate(&rules).unwrap();
        let position = |needle: &str| code.find(needle).unwrap();
        let broad = position("case QueryExecution(rule0(_*), _) =>");
        let narrow = position("case QueryExecution(rule2(_*), _) =>");
        let duplicate = position("case QueryExecution(rule3(_*), _) =>");
        assert!(broad < narrow && narrow < duplicate);
        assert!(code.contains(r#"withQueryDetection("SELECT.*", "SELECT 1", "SELECT.*")."#));
        assert_eq!(code.matches(r#"throw new SQLException("broad")"#).count(), 2);
    }

    #[test]
    fn single_column_rows_are_not_tupled() {
        let rows = RowSet::new(
            vec![Column::new("name", ValueType::Text)],
            vec![vec!["x".into()], vec!["y".into()]],
        )
        .unwrap();
        let rules: RuleSet = [rule(RuleKind::Query, "SELECT name", vec![], RuleResult::RowSet(rows))]
            .into_iter()
            .collect();
        let handler = ScalaCodeGen::default().build_handler(&rules).unwrap();
        assert_eq!(
            handler.queries[0].body,
            vec![
                r#"rowList1(classOf[String] -> "name") :+"#,
                r#"  "x" :+"#,
                r#"  "y""#,
            ]
        );
        assert_eq!(handler.widths.into_iter().collect::<Vec<_>>(), vec![1]);
    }
}
