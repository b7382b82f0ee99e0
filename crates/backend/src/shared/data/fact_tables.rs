use contracts::shared::analytics::{Dimension, MetricKey, RangeDimension};

use crate::shared::analytics::{ColumnMap, MetricColumn};

pub const SALES_TABLE: &str = "f100_sales_facts";
pub const PURCHASE_TABLE: &str = "f101_purchase_facts";

/// One row per sold product line, denormalized with the product and
/// pharmacy attributes valid at sale time.
pub const CREATE_SALES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS f100_sales_facts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sale_date TEXT NOT NULL,
        pharmacy_id TEXT NOT NULL,
        pharmacy_name TEXT,
        region_code TEXT,
        region_name TEXT,
        product_code TEXT NOT NULL,
        product_name TEXT,
        laboratory_code TEXT,
        laboratory_name TEXT,
        category_level_0 TEXT,
        category_level_1 TEXT,
        category_level_2 TEXT,
        category_level_3 TEXT,
        category_level_4 TEXT,
        category_level_5 TEXT,
        generic_group_id TEXT,
        generic_group_name TEXT,
        generic_status TEXT,
        product_type TEXT,
        is_reimbursed INTEGER,
        tva_rate REAL,
        purchase_price_net REAL,
        purchase_price_gross REAL,
        sell_price REAL,
        discount_percent REAL,
        margin_percent REAL,
        quantity INTEGER NOT NULL DEFAULT 0,
        sales_amount_ttc REAL NOT NULL DEFAULT 0,
        sales_amount_ht REAL NOT NULL DEFAULT 0,
        margin_amount REAL NOT NULL DEFAULT 0
    );
"#;

/// One row per received purchase line.
pub const CREATE_PURCHASE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS f101_purchase_facts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        purchase_date TEXT NOT NULL,
        pharmacy_id TEXT NOT NULL,
        supplier_category TEXT,
        supplier_name TEXT,
        product_code TEXT NOT NULL,
        laboratory_code TEXT,
        category_level_0 TEXT,
        category_level_1 TEXT,
        category_level_2 TEXT,
        category_level_3 TEXT,
        category_level_4 TEXT,
        category_level_5 TEXT,
        generic_group_id TEXT,
        generic_status TEXT,
        product_type TEXT,
        is_reimbursed INTEGER,
        tva_rate REAL,
        purchase_price_net REAL,
        purchase_price_gross REAL,
        quantity INTEGER NOT NULL DEFAULT 0,
        amount_ht REAL NOT NULL DEFAULT 0
    );
"#;

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_f100_date ON f100_sales_facts (sale_date)",
    "CREATE INDEX IF NOT EXISTS idx_f100_pharmacy_date ON f100_sales_facts (pharmacy_id, sale_date)",
    "CREATE INDEX IF NOT EXISTS idx_f100_laboratory ON f100_sales_facts (laboratory_code)",
    "CREATE INDEX IF NOT EXISTS idx_f100_product ON f100_sales_facts (product_code)",
    "CREATE INDEX IF NOT EXISTS idx_f101_date ON f101_purchase_facts (purchase_date)",
    "CREATE INDEX IF NOT EXISTS idx_f101_pharmacy_date ON f101_purchase_facts (pharmacy_id, purchase_date)",
];

const FACT_DIMENSIONS: &[(Dimension, &str)] = &[
    (Dimension::Pharmacy, "f.pharmacy_id"),
    (Dimension::Laboratory, "f.laboratory_code"),
    (Dimension::Product, "f.product_code"),
    (Dimension::CategoryLevel0, "f.category_level_0"),
    (Dimension::CategoryLevel1, "f.category_level_1"),
    (Dimension::CategoryLevel2, "f.category_level_2"),
    (Dimension::CategoryLevel3, "f.category_level_3"),
    (Dimension::CategoryLevel4, "f.category_level_4"),
    (Dimension::CategoryLevel5, "f.category_level_5"),
    (Dimension::GenericGroup, "f.generic_group_id"),
];

/// Filter columns of `f100_sales_facts f`.
pub static SALES_COLUMNS: ColumnMap = ColumnMap {
    dimensions: FACT_DIMENSIONS,
    ranges: &[
        (RangeDimension::PurchasePriceNet, "f.purchase_price_net"),
        (RangeDimension::PurchasePriceGross, "f.purchase_price_gross"),
        (RangeDimension::SellPrice, "f.sell_price"),
        (RangeDimension::DiscountPercent, "f.discount_percent"),
        (RangeDimension::MarginPercent, "f.margin_percent"),
    ],
    tva_rate: Some("f.tva_rate"),
    reimbursement: Some("f.is_reimbursed"),
    generic_status: Some("f.generic_status"),
    product_type: Some("f.product_type"),
};

/// Filter columns of `f101_purchase_facts f`. Sell-side ranges do not
/// exist on purchases.
pub static PURCHASE_COLUMNS: ColumnMap = ColumnMap {
    dimensions: FACT_DIMENSIONS,
    ranges: &[
        (RangeDimension::PurchasePriceNet, "f.purchase_price_net"),
        (RangeDimension::PurchasePriceGross, "f.purchase_price_gross"),
    ],
    tva_rate: Some("f.tva_rate"),
    reimbursement: Some("f.is_reimbursed"),
    generic_status: Some("f.generic_status"),
    product_type: Some("f.product_type"),
};

/// Sales-side metrics shared by most subjects.
pub const SALES_METRICS: &[MetricColumn] = &[
    MetricColumn {
        key: MetricKey::Quantity,
        expr: "SUM(f.quantity)",
    },
    MetricColumn {
        key: MetricKey::SalesAmount,
        expr: "SUM(f.sales_amount_ttc)",
    },
    MetricColumn {
        key: MetricKey::MarginAmount,
        expr: "SUM(f.margin_amount)",
    },
    MetricColumn {
        key: MetricKey::MarginRate,
        expr: "SUM(f.margin_amount) * 100.0 / NULLIF(SUM(f.sales_amount_ht), 0)",
    },
];

pub const PURCHASE_METRICS: &[MetricColumn] = &[
    MetricColumn {
        key: MetricKey::PurchaseQuantity,
        expr: "SUM(f.quantity)",
    },
    MetricColumn {
        key: MetricKey::PurchaseAmount,
        expr: "SUM(f.amount_ht)",
    },
];
