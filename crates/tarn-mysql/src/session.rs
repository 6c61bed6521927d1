//! MySQL session implementation

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use mysql_async::consts::ColumnType;
use mysql_async::prelude::*;
use mysql_async::{Conn, Params, Row as MySqlRow};
use tarn_core::{DbError, Result, Row, Session, Value};


/// A single MySQL connection behind the `Session` trait.
///
/// Autocommit is disabled at connect time, so writes stay pending until
/// `commit` or `rollback`. The connection lives in an `Option` because
/// `close` must move it into the driver's disconnect.
pub struct MySqlSession {
    conn: Option<Conn>,
}

impl MySqlSession {
    pub(crate) fn new(conn: Conn) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn_mut(&mut self) -> Result<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| DbError::Connection("session is closed".into()))
    }
}

#[async_trait]
impl Session for MySqlSession {
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let conn = self.conn_mut()?;
        let mysql_rows: Vec<MySqlRow> = conn
            .exec(sql, to_params(params))
            .await
            .map_err(|e| DbError::Query(format!("failed to execute query: {}", e)))?;

        let mut column_names = Vec::new();
        let mut column_types = Vec::new();
        if let Some(first_row) = mysql_rows.first() {
            for col in first_row.columns_ref() {
                column_names.push(col.name_str().to_string());
                column_types.push(col.column_type());
            }
        }

        let mut rows = Vec::with_capacity(mysql_rows.len());
        for mysql_row in mysql_rows {
            let mut values = Vec::with_capacity(column_names.len());
            for idx in 0..column_names.len() {
                let mysql_val: mysql_async::Value =
                    mysql_row.get(idx).unwrap_or(mysql_async::Value::NULL);
                let col_type = column_types
                    .get(idx)
                    .copied()
                    .unwrap_or(ColumnType::MYSQL_TYPE_STRING);
                values.push(from_mysql_value(mysql_val, col_type));
            }
            rows.push(Row::new(column_names.clone(), values));
        }
        Ok(rows)
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let conn = self.conn_mut()?;
        conn.exec_drop(sql, to_params(params))
            .await
            .map_err(update_error)?;
        Ok(conn.affected_rows())
    }

    async fn commit(&mut self) -> Result<()> {
        let conn = self.conn_mut()?;
        conn.query_drop("COMMIT")
            .await
            .map_err(|e| DbError::Update(format!("failed to commit: {}", e)))
    }

    async fn rollback(&mut self) -> Result<()> {
        let conn = self.conn_mut()?;
        conn.query_drop("ROLLBACK")
            .await
            .map_err(|e| DbError::Update(format!("failed to roll back: {}", e)))
    }

    async fn ping(&mut self) -> Result<()> {
        let conn = self.conn_mut()?;
        conn.ping()
            .await
            .map_err(|e| DbError::Connection(format!("ping failed: {}", e)))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect()
                .await
                .map_err(|e| DbError::Connection(format!("failed to close session: {}", e)))?;
        }
        Ok(())
    }
}

/// MySQL server error codes that signal an integrity constraint violation
/// (duplicate key, NOT NULL, foreign key, CHECK).
const INTEGRITY_ERROR_CODES: &[u16] = &[
    1022, 1048, 1062, 1169, 1216, 1217, 1451, 1452, 1557, 1586, 1761, 1762, 3819,
];

pub(crate) fn is_integrity_violation(code: u16) -> bool {
    INTEGRITY_ERROR_CODES.contains(&code)
}

/// Map a write-path driver error to `DbError::Update`, calling out
/// integrity violations in the message.
fn update_error(e: mysql_async::Error) -> DbError {
    if let mysql_async::Error::Server(ref server) = e {
        if is_integrity_violation(server.code) {
            return DbError::Update(format!(
                "integrity constraint violation: {}",
                server.message
            ));
        }
    }
    DbError::Update(format!("failed to execute statement: {}", e))
}

fn to_params(params: &[Value]) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.iter().map(to_mysql_value).collect())
    }
}

/// Convert our Value to a mysql_async Value for the binary protocol
pub(crate) fn to_mysql_value(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(v) => mysql_async::Value::Int(*v as i64),
        Value::Int64(v) => mysql_async::Value::Int(*v),
        Value::Float64(v) => mysql_async::Value::Double(*v),
        Value::String(v) => mysql_async::Value::Bytes(v.clone().into_bytes()),
        Value::Bytes(v) => mysql_async::Value::Bytes(v.clone()),
        Value::Date(d) => {
            mysql_async::Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::Time(t) => mysql_async::Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1000,
        ),
        Value::DateTime(dt) => mysql_async::Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1000,
        ),
        Value::Json(v) => mysql_async::Value::Bytes(v.to_string().into_bytes()),
    }
}

/// Convert a mysql_async Value to our Value type, using column type metadata
/// to correctly interpret byte strings from the text protocol.
pub(crate) fn from_mysql_value(val: mysql_async::Value, col_type: ColumnType) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => {
            if let Ok(s) = String::from_utf8(bytes.clone()) {
                match col_type {
                    ColumnType::MYSQL_TYPE_TINY
                    | ColumnType::MYSQL_TYPE_SHORT
                    | ColumnType::MYSQL_TYPE_LONG
                    | ColumnType::MYSQL_TYPE_LONGLONG
                    | ColumnType::MYSQL_TYPE_INT24
                    | ColumnType::MYSQL_TYPE_YEAR => {
                        s.parse::<i64>().map(Value::Int64).unwrap_or(Value::String(s))
                    }
                    ColumnType::MYSQL_TYPE_FLOAT
                    | ColumnType::MYSQL_TYPE_DOUBLE
                    | ColumnType::MYSQL_TYPE_DECIMAL
                    | ColumnType::MYSQL_TYPE_NEWDECIMAL => s
                        .parse::<f64>()
                        .map(Value::Float64)
                        .unwrap_or(Value::String(s)),
                    ColumnType::MYSQL_TYPE_JSON => serde_json::from_str(&s)
                        .map(Value::Json)
                        .unwrap_or(Value::String(s)),
                    _ => Value::String(s),
                }
            } else {
                Value::Bytes(bytes)
            }
        }
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => {
            if u <= i64::MAX as u64 {
                Value::Int64(u as i64)
            } else {
                Value::String(u.to_string())
            }
        }
        mysql_async::Value::Float(f) => Value::Float64(f as f64),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                if let Some(date) =
                    chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                {
                    Value::Date(date)
                } else {
                    Value::String(format!("{:04}-{:02}-{:02}", year, month, day))
                }
            } else if let Some(dt) =
                chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                    .and_then(|d| d.and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro))
            {
                Value::DateTime(dt)
            } else {
                Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                ))
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            if !negative && days == 0 {
                if let Some(time) = chrono::NaiveTime::from_hms_micro_opt(
                    hours as u32,
                    mins as u32,
                    secs as u32,
                    micros,
                ) {
                    return Value::Time(time);
                }
            }
            // Negative or multi-day intervals have no NaiveTime representation
            let total_hours = (days as u32) * 24 + (hours as u32);
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, mins, secs, micros
            ))
        }
    }
}
