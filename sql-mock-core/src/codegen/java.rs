//! Conditional-chain handler: one guarded `if` per rule, in rule order.

use tracing::info;

use crate::{
    codegen::{CodeGen, CodeGenError, ErrorStyle, GeneratorConfig, source::Source},
    rule::{Rule, RuleKind, RuleResult},
    rule_set::RuleSet,
    types::{Target, Value, ValueType, format_raw, quote},
};

const TARGET: Target = Target::Java;

const IMPORTS: &[&str] = &[
    "import java.util.Arrays;",
    "import java.util.Date;",
    "import java.util.List;",
    "import java.util.function.Function;",
    "import java.util.regex.Pattern;",
    "import java.text.ParseException;",
    "import java.text.SimpleDateFormat;",
    "import java.sql.Connection;",
    "import java.sql.DriverManager;",
    "import java.sql.SQLException;",
    "import acolyte.CompositeHandler;",
    "import acolyte.StatementHandler;",
    "import acolyte.StatementHandler.Parameter;",
    "import acolyte.ParameterMetaData;",
    "import acolyte.QueryResult;",
    "import acolyte.RowLists;",
    "import acolyte.UpdateResult;",
    "import static acolyte.RowList.Column;",
];

/// One `if` of a handler chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub rule: usize,
    /// Materialized constraint list, declared right before the `if`.
    pub constraints: Option<String>,
    /// Conditions joined with `&&`.
    pub guard: Vec<String>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handler {
    pub detections: Vec<String>,
    pub queries: Vec<Branch>,
    pub updates: Vec<Branch>,
}

#[derive(Debug, Clone, Default)]
pub struct JavaCodeGen {
    config: GeneratorConfig,
}

fn parameter(value: &Value) -> String {
    let literal = value.literal(TARGET);
    let meta = match value.value_type() {
        ValueType::Text => "ParameterMetaData.Str()".to_string(),
        ValueType::Number => format!("ParameterMetaData.Float({literal})"),
        ValueType::Date => "ParameterMetaData.Date()".to_string(),
    };
    format!("Parameter.of({meta}, {literal})")
}

impl JavaCodeGen {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn error_body(&self, kind: RuleKind, message: &str) -> String {
        let message = quote(message);
        match (self.config.error_style, kind) {
            (ErrorStyle::Raise, _) => format!("throw new SQLException({message});"),
            (ErrorStyle::Warning, RuleKind::Query) => {
                format!("return QueryResult.Nil.withWarning({message});")
            }
            (ErrorStyle::Warning, RuleKind::Update) => {
                format!("return UpdateResult.Nothing.withWarning({message});")
            }
        }
    }

    fn branch(&self, index: usize, rule: &Rule) -> Result<Branch, CodeGenError> {
        let pattern = rule.pattern();
        let mut guard = vec![format!(
            "Pattern.matches({}, sql)",
            quote(pattern.expression())
        )];
        let constraints = match pattern.parameters() {
            [] => None,
            parameters => {
                let count = parameters.len();
                let list = parameters
                    .iter()
                    .map(parameter)
                    .collect::<Vec<_>>()
                    .join(", ");
                guard.push(format!("parameters.size() >= {count}"));
                guard.push(format!(
                    "ps{index}.equals(parameters.subList(0, {count}))"
                ));
                Some(format!(
                    "final List<Parameter> ps{index} = Arrays.asList({list});"
                ))
            }
        };

        let body = match rule.result() {
            RuleResult::Error { message } => vec![self.error_body(rule.kind(), message)],
            RuleResult::UpdateCount { count } => vec![format!("return new UpdateResult({count});")],
            RuleResult::RowSet(row_set) => {
                let width = self.config.checked_width(index, row_set)?;
                let columns = row_set
                    .schema()
                    .iter()
                    .map(|column| {
                        format!(
                            "Column({}, {})",
                            column.column_type.target_type_name(TARGET),
                            quote(&column.name)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut body = vec![format!("return RowLists.rowList{width}({columns})")];
                for row in row_set.rows() {
                    let cells = row
                        .iter()
                        .zip(row_set.schema())
                        .map(|(cell, column)| format_raw(column.column_type, cell, TARGET))
                        .collect::<Vec<_>>()
                        .join(", ");
                    body.push(format!("    .append({cells})"));
                }
                body.push("    .asResult();".to_string());
                body
            }
        };

        Ok(Branch {
            rule: index,
            constraints,
            guard,
            body,
        })
    }

    /// Branches per statement kind, in rule order.
    pub fn build_handler(&self, rules: &RuleSet) -> Result<Handler, CodeGenError> {
        let mut handler = Handler::default();
        for (index, rule) in rules.iter().enumerate() {
            let branch = self.branch(index, rule)?;
            match rule.kind() {
                RuleKind::Query => {
                    handler.detections.push(quote(rule.pattern().expression()));
                    handler.queries.push(branch);
                }
                RuleKind::Update => handler.updates.push(branch),
            }
        }
        Ok(handler)
    }

    fn chain(branches: &[Branch], unsupported: &str) -> Source {
        let mut chain = Source::new();
        for branch in branches {
            if let Some(constraints) = &branch.constraints {
                chain.line(constraints);
            }
            let mut body = Source::new();
            for line in &branch.body {
                body.line(line);
            }
            chain
                .line(format!("if ({}) {{", branch.guard.join(" && ")))
                .indent(body)
                .line("}")
                .blank();
        }
        chain.line(format!(
            "throw new RuntimeException({});",
            quote(unsupported)
        ));
        chain
    }

    fn apply(result: &str, branches: &[Branch], unsupported: &str) -> Source {
        let mut method = Source::new();
        method
            .line(format!(
                "public {result} apply(String sql, List<Parameter> parameters) throws SQLException {{"
            ))
            .indent(Self::chain(branches, unsupported))
            .line("}");
        method
    }

    pub fn build(&self, rules: &RuleSet) -> Result<Source, CodeGenError> {
        let handler = self.build_handler(rules)?;
        let handler_id = &self.config.handler_id;

        let mut source = Source::new();
        for import in IMPORTS {
            source.line(*import);
        }
        source
            .blank()
            .line(format!(
                "final String jdbcUrl = {};",
                quote(&self.config.jdbc_url())
            ))
            .blank();
        for line in TARGET.date_format_declaration() {
            source.line(line);
        }
        source
            .blank()
            .line("StatementHandler handler = new CompositeHandler().");

        let mut chain = Source::new();
        if !handler.detections.is_empty() {
            chain.line(format!(
                "withQueryDetection({}).",
                handler.detections.join(", ")
            ));
        }
        chain
            .line("withQueryHandler(new CompositeHandler.QueryHandler() {")
            .indent(Self::apply(
                "QueryResult",
                &handler.queries,
                "Unsupported JDBC query",
            ))
            .line("}).")
            .line("withUpdateHandler(new CompositeHandler.UpdateHandler() {")
            .indent(Self::apply(
                "UpdateResult",
                &handler.updates,
                "Unsupported JDBC update",
            ))
            .line("});");
        source
            .indent(chain)
            .blank()
            .line(format!(
                "// Register prepared handler with expected ID '{handler_id}'"
            ))
            .line(format!("acolyte.Driver.register({}, handler);", quote(handler_id)))
            .blank()
            .line("// then when existing code do ...")
            .line("Connection con = DriverManager.getConnection(jdbcUrl);");
        Ok(source)
    }
}

impl CodeGen for JavaCodeGen {
    fn name(&self) -> &'static str {
        "java"
    }

    fn generate(&self, rules: &RuleSet) -> Result<String, CodeGenError> {
        info!(rules = rules.len(), "generating java handler");
        Ok(self.build(rules)?.render())
    }
}
