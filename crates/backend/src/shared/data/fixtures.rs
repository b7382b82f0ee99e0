//! In-memory fact tables shared by repository tests.

use chrono::NaiveDate;
use contracts::shared::analytics::{DateRange, PeriodContext};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

use super::db::ensure_schema;

const SALES_ROWS: &str = r#"
    INSERT INTO f100_sales_facts (
        sale_date, pharmacy_id, pharmacy_name, region_code, region_name,
        product_code, product_name, laboratory_code, laboratory_name,
        category_level_0, category_level_1, generic_group_id, generic_group_name,
        generic_status, product_type, is_reimbursed, tva_rate, sell_price,
        quantity, sales_amount_ttc, sales_amount_ht, margin_amount
    ) VALUES
    ('2025-01-05', 'PH1', 'Pharmacie du Centre', 'IDF', 'Ile-de-France',
     'P1', 'Doliprane 1000', 'LAB_A', 'Sanofi',
     'MEDICAMENTS', 'ANTALGIQUES', 'GG1', 'Paracetamol', 'PRINCEPS', 'MEDICAMENT', 1, 2.1, 3.0,
     10, 30.0, 29.4, 9.0),
    ('2025-01-06', 'PH2', 'Pharmacie de la Gare', 'ARA', 'Auvergne-Rhone-Alpes',
     'P2', 'Ibuprofene 400', 'LAB_B', 'Biogaran',
     'MEDICAMENTS', 'ANTALGIQUES', 'GG1', 'Paracetamol', 'GENERIC', 'MEDICAMENT', 1, 2.1, 2.5,
     20, 50.0, 49.0, 15.0),
    ('2025-01-20', 'PH1', 'Pharmacie du Centre', 'IDF', 'Ile-de-France',
     'P3', 'Creme hydratante', 'LAB_C', 'Avene',
     'PARAPHARMACIE', 'SOINS', NULL, NULL, NULL, 'PARAPHARMACIE', 0, 20.0, 12.0,
     5, 60.0, 50.0, 20.0),
    ('2024-01-05', 'PH1', 'Pharmacie du Centre', 'IDF', 'Ile-de-France',
     'P1', 'Doliprane 1000', 'LAB_A', 'Sanofi',
     'MEDICAMENTS', 'ANTALGIQUES', 'GG1', 'Paracetamol', 'PRINCEPS', 'MEDICAMENT', 1, 2.1, 5.0,
     8, 40.0, 39.2, 10.0),
    ('2024-01-06', 'PH2', 'Pharmacie de la Gare', 'ARA', 'Auvergne-Rhone-Alpes',
     'P2', 'Ibuprofene 400', 'LAB_B', 'Biogaran',
     'MEDICAMENTS', 'ANTALGIQUES', 'GG1', 'Paracetamol', 'GENERIC', 'MEDICAMENT', 1, 2.1, 2.0,
     5, 10.0, 9.8, 3.0)
"#;

const PURCHASE_ROWS: &str = r#"
    INSERT INTO f101_purchase_facts (
        purchase_date, pharmacy_id, supplier_category, supplier_name,
        product_code, laboratory_code, category_level_0, generic_group_id,
        generic_status, product_type, is_reimbursed, tva_rate,
        purchase_price_net, purchase_price_gross, quantity, amount_ht
    ) VALUES
    ('2025-01-10', 'PH1', 'GROSSISTE', 'OCP', 'P1', 'LAB_A', 'MEDICAMENTS', 'GG1',
     'PRINCEPS', 'MEDICAMENT', 1, 2.1, 2.0, 2.2, 100, 200.0),
    ('2025-01-12', 'PH2', 'DIRECT', 'Biogaran Direct', 'P2', 'LAB_B', 'MEDICAMENTS', 'GG1',
     'GENERIC', 'MEDICAMENT', 1, 2.1, 1.8, 2.0, 50, 90.0),
    ('2024-01-10', 'PH1', 'GROSSISTE', 'OCP', 'P1', 'LAB_A', 'MEDICAMENTS', 'GG1',
     'PRINCEPS', 'MEDICAMENT', 1, 2.1, 1.875, 2.0, 80, 150.0)
"#;

pub async fn seeded_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();

    ensure_schema(&db).await.unwrap();
    db.execute_unprepared(SALES_ROWS).await.unwrap();
    db.execute_unprepared(PURCHASE_ROWS).await.unwrap();
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// January 2025 against January 2024.
pub fn january_vs_prior_year() -> PeriodContext {
    PeriodContext::compared(
        DateRange::new(date(2025, 1, 1), date(2025, 1, 31)),
        DateRange::new(date(2024, 1, 1), date(2024, 1, 31)),
    )
}

pub fn january_only() -> PeriodContext {
    PeriodContext::single(DateRange::new(date(2025, 1, 1), date(2025, 1, 31)))
}
