use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::ColumnsConfig;
use crate::constants::UNKNOWN_STATUS;
use crate::pipeline::processing::values::{month_key, parse_days, parse_money, parse_sync_date, round_to};
use crate::types::Record;

/// Summary statistics over the filtered records. Every map is key-sorted and the
/// report carries no timestamp, so identical input serializes identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub total_processos: usize,
    pub status_distribution: BTreeMap<String, usize>,
    pub processos_por_mes: BTreeMap<String, usize>,
    pub status_por_mes: BTreeMap<String, BTreeMap<String, usize>>,
    pub tempo_medio_por_mes: BTreeMap<String, f64>,
    pub valores: BTreeMap<String, MonetaryTotal>,
    pub datas_invalidas: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonetaryTotal {
    /// Sum rounded to cents
    pub total: f64,
    /// Values that parsed
    pub registros: usize,
    /// Values that did not parse
    pub ignorados: usize,
}

/// Columns the aggregator reads from each filtered record.
#[derive(Debug, Clone)]
pub struct AggregateColumns {
    pub status: String,
    pub sync_date: String,
    pub return_days: String,
    pub monetary: Vec<String>,
}

impl From<&ColumnsConfig> for AggregateColumns {
    fn from(columns: &ColumnsConfig) -> Self {
        Self {
            status: columns.status.clone(),
            sync_date: columns.sync_date.clone(),
            return_days: columns.return_days.clone(),
            monetary: columns.monetary.clone(),
        }
    }
}

#[derive(Default)]
struct DaysAccumulator {
    total: i64,
    count: usize,
}

#[instrument(skip(records, columns), fields(records = records.len()))]
pub fn aggregate(records: &[Record], columns: &AggregateColumns) -> AggregateReport {
    let mut report = AggregateReport {
        total_processos: records.len(),
        ..Default::default()
    };
    let mut days_by_month: BTreeMap<String, DaysAccumulator> = BTreeMap::new();
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();

    for column in &columns.monetary {
        report.valores.insert(column.clone(), MonetaryTotal::default());
        sums.insert(column.clone(), 0.0);
    }

    for record in records {
        let status = match record.value(&columns.status).trim() {
            "" => UNKNOWN_STATUS.to_string(),
            s => s.to_string(),
        };
        *report.status_distribution.entry(status.clone()).or_default() += 1;

        let raw_date = record.value(&columns.sync_date).trim();
        if !raw_date.is_empty() {
            match parse_sync_date(raw_date) {
                Ok(date) => {
                    let month = month_key(&date);
                    *report.processos_por_mes.entry(month.clone()).or_default() += 1;
                    *report
                        .status_por_mes
                        .entry(month.clone())
                        .or_default()
                        .entry(status)
                        .or_default() += 1;

                    match parse_days(record.value(&columns.return_days)) {
                        Ok(days) => {
                            let acc = days_by_month.entry(month).or_default();
                            acc.total += days;
                            acc.count += 1;
                        }
                        Err(e) => debug!("Skipping return time: {}", e),
                    }
                }
                Err(e) => {
                    debug!("Skipping monthly buckets: {}", e);
                    report.datas_invalidas += 1;
                }
            }
        }

        for column in &columns.monetary {
            let Some(raw) = record.get(column) else { continue };
            match parse_money(raw) {
                Ok(Some(value)) => {
                    if let Some(sum) = sums.get_mut(column) {
                        *sum += value;
                    }
                    if let Some(total) = report.valores.get_mut(column) {
                        total.registros += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Ignoring value in {:?}: {}", column, e);
                    if let Some(total) = report.valores.get_mut(column) {
                        total.ignorados += 1;
                    }
                }
            }
        }
    }

    report.tempo_medio_por_mes = days_by_month
        .into_iter()
        .map(|(month, acc)| {
            let mean = if acc.count > 0 {
                round_to(acc.total as f64 / acc.count as f64, 1)
            } else {
                0.0
            };
            (month, mean)
        })
        .collect();

    for (column, sum) in sums {
        if let Some(total) = report.valores.get_mut(&column) {
            total.total = round_to(sum, 2);
        }
    }

    info!(
        "Aggregated {} records: {} statuses, {} months",
        report.total_processos,
        report.status_distribution.len(),
        report.processos_por_mes.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> AggregateColumns {
        AggregateColumns {
            status: "Status".to_string(),
            sync_date: "Data Sincronismo".to_string(),
            return_days: "Dias de retorno".to_string(),
            monetary: vec!["Valor da Causa".to_string()],
        }
    }

    fn record(status: &str, date: &str, days: &str, value: &str) -> Record {
        vec![
            ("Status", status),
            ("Data Sincronismo", date),
            ("Dias de retorno", days),
            ("Valor da Causa", value),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_counts_by_status_and_month() {
        let records = vec![
            record("Aprovado", "05/01/2024", "10", ""),
            record("Aprovado", "20/01/2024", "20", ""),
            record("Negado", "03/02/2024", "5", ""),
            record("", "", "", ""),
        ];

        let report = aggregate(&records, &columns());

        assert_eq!(report.total_processos, 4);
        assert_eq!(report.status_distribution["Aprovado"], 2);
        assert_eq!(report.status_distribution["Negado"], 1);
        assert_eq!(report.status_distribution[UNKNOWN_STATUS], 1);
        assert_eq!(report.processos_por_mes["2024-01"], 2);
        assert_eq!(report.processos_por_mes["2024-02"], 1);
        assert_eq!(report.status_por_mes["2024-01"]["Aprovado"], 2);
        assert_eq!(report.tempo_medio_por_mes["2024-01"], 15.0);
        assert_eq!(report.tempo_medio_por_mes["2024-02"], 5.0);
    }

    #[test]
    fn test_invalid_dates_and_days_are_tolerated() {
        let records = vec![
            record("Aprovado", "32/13/2024", "10", ""),
            record("Aprovado", "01/03/2024", "-", ""),
            record("Aprovado", "02/03/2024", "", ""),
            record("Aprovado", "03/03/2024", "7", ""),
        ];

        let report = aggregate(&records, &columns());

        assert_eq!(report.datas_invalidas, 1);
        assert_eq!(report.processos_por_mes["2024-03"], 3);
        // "-" skipped, empty counted as zero
        assert_eq!(report.tempo_medio_por_mes["2024-03"], 3.5);
    }

    #[test]
    fn test_two_digit_year_is_an_invalid_date() {
        let records = vec![record("Aprovado", "10/01/24", "3", ""), record("Negado", "10/01/2024", "5", "")];

        let report = aggregate(&records, &columns());

        assert_eq!(report.datas_invalidas, 1);
        assert_eq!(report.processos_por_mes.len(), 1);
        assert_eq!(report.processos_por_mes["2024-01"], 1);
        assert!(!report.processos_por_mes.contains_key("0024-01"));
    }

    #[test]
    fn test_monetary_totals() {
        let records = vec![
            record("A", "", "", "R$ 1.234,56"),
            record("A", "", "", "-"),
            record("A", "", "", "R$ 0,10"),
            record("A", "", "", "R$ 0,20"),
            record("A", "", "", "a definir"),
        ];

        let report = aggregate(&records, &columns());
        let total = &report.valores["Valor da Causa"];

        assert_eq!(total.total, 1234.86);
        assert_eq!(total.registros, 3);
        assert_eq!(total.ignorados, 1);
    }

    #[test]
    fn test_report_is_reproducible() {
        let records = vec![
            record("Em análise", "10/04/2024", "3", "R$ 99,90"),
            record("Aprovado", "11/05/2024", "8", "R$ 1.000,00"),
        ];

        let first = serde_json::to_string(&aggregate(&records, &columns())).unwrap();
        let second = serde_json::to_string(&aggregate(&records, &columns())).unwrap();
        assert_eq!(first, second);
    }
}
