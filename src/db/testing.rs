// ABOUTME: Scripted query runner for unit tests
// ABOUTME: Returns canned results by SQL prefix and records every statement it sees

use std::cell::RefCell;

use super::runner::{Dialect, QueryError, QueryRunner, Row, Statement, Value};

enum Response {
    Rows(Vec<Row>),
    Fail,
}

struct Rule {
    fragment: String,
    param: Option<String>,
    response: Response,
}

impl Rule {
    fn matches(&self, statement: &Statement) -> bool {
        statement.sql.contains(self.fragment.as_str())
            && self
                .param
                .as_ref()
                .map_or(true, |p| statement.params.contains(p))
    }
}

/// Runner whose answers are registered up front.
///
/// A statement gets the response of the first rule whose SQL fragment it
/// contains (and whose parameter it binds, if the rule names one); unmatched
/// statements return no rows.
#[derive(Default)]
pub struct FakeRunner {
    rules: RefCell<Vec<Rule>>,
    executed: RefCell<Vec<Statement>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, fragment: &str, param: Option<&str>, response: Response) -> &Self {
        self.rules.borrow_mut().push(Rule {
            fragment: fragment.to_string(),
            param: param.map(str::to_string),
            response,
        });
        self
    }

    pub fn respond(&self, fragment: &str, rows: Vec<Vec<&str>>) -> &Self {
        self.push(fragment, None, Response::Rows(text_rows(rows)))
    }

    /// Like `respond`, but only for statements binding `param`
    pub fn respond_bound(&self, fragment: &str, param: &str, rows: Vec<Vec<&str>>) -> &Self {
        self.push(fragment, Some(param), Response::Rows(text_rows(rows)))
    }

    pub fn respond_values(&self, fragment: &str, rows: Vec<Row>) -> &Self {
        self.push(fragment, None, Response::Rows(rows))
    }

    pub fn fail(&self, fragment: &str) -> &Self {
        self.push(fragment, None, Response::Fail)
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.executed.borrow().clone()
    }

    /// Number of executed statements whose SQL contains `fragment`
    pub fn count(&self, fragment: &str) -> usize {
        self.executed
            .borrow()
            .iter()
            .filter(|s| s.sql.contains(fragment))
            .count()
    }
}

impl QueryRunner for FakeRunner {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn run(&self, statement: &Statement) -> Result<Vec<Row>, QueryError> {
        self.executed.borrow_mut().push(statement.clone());
        let rules = self.rules.borrow();
        match rules.iter().find(|rule| rule.matches(statement)).map(|rule| &rule.response) {
            Some(Response::Rows(rows)) => Ok(rows.clone()),
            Some(Response::Fail) => Err(QueryError::Execution(format!(
                "scripted failure for: {}",
                statement.sql
            ))),
            None => Ok(Vec::new()),
        }
    }
}

fn text_rows(rows: Vec<Vec<&str>>) -> Vec<Row> {
    rows.into_iter()
        .map(|row| row.into_iter().map(Value::from).collect())
        .collect()
}

/// In-memory SQLite store with one populated `ACME` system
pub fn acme_store() -> super::SqliteRunner {
    let runner = super::SqliteRunner::open_in_memory().unwrap();
    runner.attach_in_memory("ACME_SCHEMA").unwrap();
    runner
        .execute_batch(
            r#"
            CREATE TABLE ACME_SCHEMA.ACME_MAIN_TABLE (
                REGION TEXT,
                AMOUNT INTEGER
            );
            INSERT INTO ACME_SCHEMA.ACME_MAIN_TABLE (REGION, AMOUNT) VALUES
                ('NORTH', 10), ('SOUTH', 20), ('NORTH', 30), ('O''HARE', 40);

            CREATE TABLE ACME_SCHEMA.ACME_MAIN_TABLE_DESCRIPTION (
                COLUMN_NAME TEXT NOT NULL,
                DATA_TYPE TEXT NOT NULL,
                UNIQUE_VALUES TEXT,
                DESCRIPTION TEXT
            );
            INSERT INTO ACME_SCHEMA.ACME_MAIN_TABLE_DESCRIPTION VALUES
                ('REGION', 'TEXT', '', 'Sales region'),
                ('AMOUNT', 'INTEGER', NULL, NULL);

            CREATE TABLE ACME_SCHEMA.ACME_PROMPT_TABLE (
                NAME TEXT PRIMARY KEY,
                TEXT TEXT NOT NULL
            );
            INSERT INTO ACME_SCHEMA.ACME_PROMPT_TABLE VALUES
                ('SQL_GENERATION_PROMPT', 'Write SQL for ACME');
            "#,
        )
        .unwrap();
    runner
}
