use pretty_assertions::assert_eq;
use sql_mock_core::{
    CodeGen, CodeGenError, Column, EditorSession, Execution, GeneratorConfig, JavaCodeGen,
    JsonCodeGen, Outcome, Pattern, RowSet, Rule, RuleDraft, RuleKind, RuleResult, RuleSet,
    ScalaCodeGen, Target, Value, ValueType, code_generator, resolve,
};

fn rule(kind: RuleKind, expression: &str, parameters: Vec<Value>, result: RuleResult) -> Rule {
    Rule::new(kind, Pattern::new(expression, parameters).unwrap(), result).unwrap()
}

fn labels() -> RuleSet {
    let rows = RowSet::new(
        vec![
            Column::new("id", ValueType::Number),
            Column::new("label", ValueType::Text),
        ],
        vec![
            vec!["1".into(), r#"a"b""#.into()],
            vec!["2".into(), "plain".into()],
        ],
    )
    .unwrap();
    [rule(
        RuleKind::Query,
        "SELECT id, label FROM labels",
        vec![],
        RuleResult::RowSet(rows),
    )]
    .into_iter()
    .collect()
}

fn sample() -> RuleSet {
    let labels = labels();
    [
        rule(
            RuleKind::Update,
            "UPDATE test SET.*",
            vec![Value::text("x"), Value::number("3").unwrap()],
            RuleResult::update_count(2),
        ),
        rule(
            RuleKind::Query,
            "SELECT .* FROM events WHERE day = \\?",
            vec![Value::date("2014-03-09").unwrap()],
            RuleResult::error("boom"),
        ),
    ]
    .into_iter()
    .chain(labels.iter().cloned())
    .collect()
}

#[test]
fn json_round_trip_preserves_rules() {
    let rules = sample();
    let json = JsonCodeGen.generate(&rules).unwrap();
    assert_eq!(RuleSet::from_json(&json).unwrap(), rules);
    assert_eq!(RuleSet::from_json(&rules.to_json().unwrap()).unwrap(), rules);
}

#[test]
fn moving_down_then_up_restores_order() {
    let original = sample();
    let mut rules = original.clone();
    rules.move_down(0).unwrap();
    assert_ne!(rules, original);
    rules.move_up(1).unwrap();
    assert_eq!(rules, original);
}

#[test]
fn first_matching_rule_wins() {
    let broad = rule(RuleKind::Query, "SELECT.*", vec![], RuleResult::error("broad"));
    let narrow = rule(RuleKind::Query, "SELECT 1", vec![], RuleResult::error("narrow"));
    let execution = Execution::query("SELECT 1", vec![]);

    let rules: RuleSet = [broad.clone(), narrow.clone()].into_iter().collect();
    assert_eq!(resolve(&rules, &execution).index(), Some(0));

    let rules: RuleSet = [narrow, broad].into_iter().collect();
    let Outcome::Matched { index, result } = resolve(&rules, &execution) else {
        panic!("expected a match");
    };
    assert_eq!(index, 0);
    assert_eq!(result, &RuleResult::error("narrow"));
}

#[test]
fn parameters_compare_by_type_and_value() {
    let rules = sample();
    let day = |raw: &str| Value::date(raw).unwrap();
    let statement = "SELECT * FROM events WHERE day = ?";

    let matched = Execution::query(statement, vec![day("2014-03-09")]);
    assert_eq!(resolve(&rules, &matched).index(), Some(1));

    let other_day = Execution::query(statement, vec![day("2014-03-10")]);
    assert_eq!(resolve(&rules, &other_day), Outcome::Unsupported);

    let as_text = Execution::query(statement, vec![Value::text("2014-03-09")]);
    assert_eq!(resolve(&rules, &as_text), Outcome::Unsupported);

    let update = Execution::update(
        "UPDATE test SET v = ?",
        vec![Value::text("x"), Value::number("3.0").unwrap(), Value::text("extra")],
    );
    assert_eq!(resolve(&rules, &update).index(), Some(0));

    let short = Execution::update("UPDATE test SET v = ?", vec![Value::text("x")]);
    assert_eq!(resolve(&rules, &short), Outcome::Unsupported);
}

#[test]
fn empty_rule_set_supports_nothing() {
    let rules = RuleSet::new();
    assert_eq!(
        resolve(&rules, &Execution::query("SELECT 1", vec![])),
        Outcome::Unsupported
    );
    assert_eq!(
        resolve(&rules, &Execution::update("DELETE FROM t", vec![])),
        Outcome::Unsupported
    );
    for target in [Target::Java, Target::Scala] {
        let code = code_generator(target, GeneratorConfig::default())
            .generate(&rules)
            .unwrap();
        assert!(code.contains("Unsupported JDBC query"));
        assert!(code.contains("Unsupported JDBC update"));
        assert!(!code.contains("withQueryDetection"));
    }
}

#[test]
fn kind_is_part_of_the_match() {
    let rules = sample();
    let as_query = Execution::query(
        "UPDATE test SET v = 1",
        vec![Value::text("x"), Value::number("3").unwrap()],
    );
    assert_eq!(resolve(&rules, &as_query), Outcome::Unsupported);
}

#[test]
fn update_scenario_through_the_editor() {
    let mut session = EditorSession::new();
    let mut draft = RuleDraft::update("UPDATE test SET.*");
    draft.push_parameter(ValueType::Text, "x").unwrap();
    draft.update_count(2);
    assert_eq!(session.add(&draft).unwrap(), 0);

    let preview = session.previews();
    assert_eq!(preview.0[0].result_summary, "2 updated rows");

    let java = JavaCodeGen::default().generate(session.rules()).unwrap();
    assert!(java.contains("return new UpdateResult(2);"));
    assert!(java.contains("ps0.equals(parameters.subList(0, 1))"));

    let scala = ScalaCodeGen::default().generate(session.rules()).unwrap();
    assert!(scala.contains("case UpdateExecution(rule0(_*), ExecutedParameter(\"x\") :: _) =>"));
    assert!(scala.contains("new UpdateResult(2)"));
}

#[test]
fn row_set_is_emitted_for_both_targets() {
    let rules = labels();

    let java = JavaCodeGen::default().generate(&rules).unwrap();
    assert_eq!(java.matches(".append(").count(), 2);
    assert!(java.contains(r#"RowLists.rowList2(Column(Float.class, "id"), Column(String.class, "label"))"#));
    assert!(java.contains(r#".append(1f, "a\"b\"")"#));
    assert!(java.contains(r#".append(2f, "plain")"#));

    let scala = ScalaCodeGen::default().generate(&rules).unwrap();
    assert!(scala.contains(r#"rowList2(classOf[Float] -> "id", classOf[String] -> "label") :+"#));
    assert!(scala.contains(r#"(1f, "a\"b\"") :+"#));
    assert!(scala.contains(r#"(2f, "plain")"#));
    assert!(scala.contains("import acolyte.RowLists.{ rowList2 }"));
}

#[test]
fn wide_schema_fails_only_the_offending_file() {
    let schema = (0..5)
        .map(|i| Column::new(format!("c{i}"), ValueType::Text))
        .collect::<Vec<_>>();
    let row = (0..5).map(|i| i.to_string()).collect();
    let wide = RowSet::new(schema, vec![row]).unwrap();
    let rules: RuleSet = [rule(
        RuleKind::Query,
        "SELECT .*",
        vec![],
        RuleResult::RowSet(wide),
    )]
    .into_iter()
    .collect();

    for target in [Target::Java, Target::Scala] {
        let error = code_generator(target, GeneratorConfig::default())
            .generate(&rules)
            .unwrap_err();
        assert!(matches!(
            error,
            CodeGenError::UnsupportedSchemaWidth {
                rule: 0,
                width: 5,
                max: 3
            }
        ));
    }
    assert!(JsonCodeGen.generate(&rules).is_ok());

    let wider = GeneratorConfig {
        max_arity: 5,
        ..Default::default()
    };
    let java = JavaCodeGen::new(wider).generate(&rules).unwrap();
    assert!(java.contains("RowLists.rowList5("));
}
