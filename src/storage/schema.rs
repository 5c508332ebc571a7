//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building
//! and the SQLite DDL. Timestamps are fixed-width RFC3339 TEXT so that string
//! order is chronological; JSON columns are TEXT.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    Company,
    Phone,
    Role,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
pub enum Orders {
    Table,
    Id,
    OrderNumber,
    UserId,
    Status,
    OrderDate,
    TotalCents,
    Currency,
    ShippingAddress,
    TrackingNumber,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductName,
    Sku,
    SerialNumber,
    Quantity,
    UnitPriceCents,
    WarrantyMonths,
}

#[derive(Iden)]
pub enum DeliveryTimelines {
    Table,
    Id,
    OrderId,
    Stage,
    Description,
    OccurredAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum Rmas {
    Table,
    Id,
    RmaNumber,
    UserId,
    OrderId,
    Status,
    ContactName,
    ContactEmail,
    ContactPhone,
    Reason,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum RmaItems {
    Table,
    Id,
    RmaId,
    ProductName,
    SerialNumber,
    FaultDescription,
    Quantity,
}

#[derive(Iden)]
pub enum RmaRequestLogs {
    Table,
    Id,
    RmaId,
    UserId,
    Payload,
    Status,
    WebhookStatus,
    EmailNotified,
    NotificationError,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum SupportTickets {
    Table,
    Id,
    UserId,
    Subject,
    Message,
    Status,
    Priority,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum CaseStudies {
    Table,
    Id,
    Title,
    Slug,
    Summary,
    Body,
    ImageUrl,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum WaterProjects {
    Table,
    Id,
    Name,
    Location,
    Description,
    LitersProvided,
    FamiliesHelped,
    Status,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum EnvironmentalImpact {
    Table,
    Id,
    UserId,
    OrderId,
    CarbonKg,
    WaterLiters,
    MineralsKg,
    FamiliesHelped,
    RecordedAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum Achievements {
    Table,
    Id,
    Code,
    Name,
    Description,
    Metric,
    Threshold,
    Points,
}

#[derive(Iden)]
pub enum Milestones {
    Table,
    Id,
    Name,
    Description,
    TargetScore,
    Reward,
    SortOrder,
}

#[derive(Iden)]
pub enum UserProgress {
    Table,
    Id,
    UserId,
    AchievementId,
    Progress,
    Completed,
    CompletedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum ApiKeys {
    Table,
    Id,
    Name,
    KeyPrefix,
    KeyHash,
    Permissions,
    Active,
    LastUsedAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum SystemSettings {
    Table,
    Key,
    Value,
    UpdatedAt,
}

/// SQLite DDL, one statement per entry, applied in order.
pub const SQLITE_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    company TEXT,
    phone TEXT,
    role TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
)"#,
    r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_number TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    status TEXT NOT NULL,
    order_date TEXT NOT NULL,
    total_cents INTEGER NOT NULL,
    currency TEXT NOT NULL,
    shipping_address TEXT,
    tracking_number TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)",
    r#"
CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_name TEXT NOT NULL,
    sku TEXT,
    serial_number TEXT,
    quantity INTEGER NOT NULL,
    unit_price_cents INTEGER NOT NULL,
    warranty_months INTEGER NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_serial ON order_items(serial_number)",
    r#"
CREATE TABLE IF NOT EXISTS delivery_timelines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    stage TEXT NOT NULL,
    description TEXT,
    occurred_at TEXT NOT NULL,
    created_at TEXT NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS rmas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rma_number TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    order_id INTEGER REFERENCES orders(id) ON DELETE SET NULL,
    status TEXT NOT NULL,
    contact_name TEXT NOT NULL,
    contact_email TEXT NOT NULL,
    contact_phone TEXT,
    reason TEXT NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_rmas_user ON rmas(user_id)",
    r#"
CREATE TABLE IF NOT EXISTS rma_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rma_id INTEGER NOT NULL REFERENCES rmas(id) ON DELETE CASCADE,
    product_name TEXT NOT NULL,
    serial_number TEXT,
    fault_description TEXT NOT NULL,
    quantity INTEGER NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS rma_request_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rma_id INTEGER NOT NULL REFERENCES rmas(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL,
    payload TEXT NOT NULL,
    status TEXT NOT NULL,
    webhook_status INTEGER,
    email_notified INTEGER NOT NULL DEFAULT 0,
    notification_error TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS support_tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS case_studies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    summary TEXT NOT NULL,
    body TEXT NOT NULL,
    image_url TEXT,
    published INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS water_projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    description TEXT NOT NULL,
    liters_provided INTEGER NOT NULL,
    families_helped INTEGER NOT NULL,
    status TEXT NOT NULL,
    image_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS environmental_impact (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    order_id INTEGER REFERENCES orders(id) ON DELETE SET NULL,
    carbon_kg REAL NOT NULL,
    water_liters REAL NOT NULL,
    minerals_kg REAL NOT NULL,
    families_helped INTEGER NOT NULL,
    recorded_at TEXT NOT NULL,
    created_at TEXT NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_impact_user ON environmental_impact(user_id)",
    r#"
CREATE TABLE IF NOT EXISTS achievements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    metric TEXT NOT NULL,
    threshold REAL NOT NULL,
    points INTEGER NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    target_score INTEGER NOT NULL,
    reward TEXT,
    sort_order INTEGER NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS user_progress (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    achievement_id INTEGER NOT NULL REFERENCES achievements(id) ON DELETE CASCADE,
    progress REAL NOT NULL,
    completed INTEGER NOT NULL,
    completed_at TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, achievement_id)
)"#,
    r#"
CREATE TABLE IF NOT EXISTS api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    key_prefix TEXT NOT NULL,
    key_hash TEXT NOT NULL UNIQUE,
    permissions TEXT NOT NULL,
    active INTEGER NOT NULL,
    last_used_at TEXT,
    created_at TEXT NOT NULL
)"#,
    r#"
CREATE TABLE IF NOT EXISTS system_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#,
];
