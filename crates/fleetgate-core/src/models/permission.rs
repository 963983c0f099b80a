//! Permission domain model.
//!
//! Permission codes form a closed enumeration rather than free-form
//! strings: every code the platform knows is a [`PermissionCode`]
//! variant, and [`PermissionCode::SuperAdmin`] is the distinguished
//! sentinel that bypasses all other authorization checks. Codes read
//! from the directory that do not parse into a known variant are
//! treated as not granted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Functional grouping of permissions, used for catalog organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionCategory {
    SystemAdministration,
    UserManagement,
    RoleManagement,
    DeviceManagement,
    VehicleManagement,
    LocationTracking,
    AlertsNotifications,
    ReportsAnalytics,
    SecurityCompliance,
}

impl PermissionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemAdministration => "SystemAdministration",
            Self::UserManagement => "UserManagement",
            Self::RoleManagement => "RoleManagement",
            Self::DeviceManagement => "DeviceManagement",
            Self::VehicleManagement => "VehicleManagement",
            Self::LocationTracking => "LocationTracking",
            Self::AlertsNotifications => "AlertsNotifications",
            Self::ReportsAnalytics => "ReportsAnalytics",
            Self::SecurityCompliance => "SecurityCompliance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    pub const ALL: [PermissionCategory; 9] = [
        Self::SystemAdministration,
        Self::UserManagement,
        Self::RoleManagement,
        Self::DeviceManagement,
        Self::VehicleManagement,
        Self::LocationTracking,
        Self::AlertsNotifications,
        Self::ReportsAnalytics,
        Self::SecurityCompliance,
    ];
}

/// An atomic capability code.
///
/// The canonical wire/storage form is SCREAMING_SNAKE_CASE
/// (e.g. `DEVICE_REGISTER`), matching [`PermissionCode::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionCode {
    // System administration
    SuperAdmin,
    SystemMaintenance,
    MultiTenantManage,
    SystemConfig,
    // User management
    UserCreate,
    UserRead,
    UserUpdate,
    UserDelete,
    UserResetPassword,
    UserActivate,
    // Role management
    RoleCreate,
    RoleRead,
    RoleUpdate,
    RoleDelete,
    RoleAssign,
    // Device management
    DeviceRead,
    DeviceRegister,
    DeviceUpdate,
    DeviceDelete,
    DeviceAssign,
    DeviceActivate,
    DeviceRemoteConfig,
    DeviceBulkOperations,
    // Vehicle management
    VehicleRead,
    VehicleCreate,
    VehicleUpdate,
    VehicleDelete,
    VehicleAssignDevice,
    FleetManage,
    VehicleMaintenance,
    // Location tracking
    ViewLocationLive,
    ViewLocationHistory,
    ExportLocation,
    GeofenceManage,
    RoutePlanning,
    PlaybackHistory,
    // Alerts & notifications
    AlertRead,
    AlertManage,
    AlertAcknowledge,
    NotificationSend,
    EmergencyAlert,
    // Reports & analytics
    ReportView,
    ReportGenerate,
    ReportSchedule,
    AnalyticsAccess,
    DataExport,
    // Security & compliance
    AuditRead,
    SecurityConfig,
    ComplianceManage,
    BackupRestore,
    ApiAccess,
}

impl PermissionCode {
    /// Every known code, in catalog order.
    pub const ALL: [PermissionCode; 51] = [
        Self::SuperAdmin,
        Self::SystemMaintenance,
        Self::MultiTenantManage,
        Self::SystemConfig,
        Self::UserCreate,
        Self::UserRead,
        Self::UserUpdate,
        Self::UserDelete,
        Self::UserResetPassword,
        Self::UserActivate,
        Self::RoleCreate,
        Self::RoleRead,
        Self::RoleUpdate,
        Self::RoleDelete,
        Self::RoleAssign,
        Self::DeviceRead,
        Self::DeviceRegister,
        Self::DeviceUpdate,
        Self::DeviceDelete,
        Self::DeviceAssign,
        Self::DeviceActivate,
        Self::DeviceRemoteConfig,
        Self::DeviceBulkOperations,
        Self::VehicleRead,
        Self::VehicleCreate,
        Self::VehicleUpdate,
        Self::VehicleDelete,
        Self::VehicleAssignDevice,
        Self::FleetManage,
        Self::VehicleMaintenance,
        Self::ViewLocationLive,
        Self::ViewLocationHistory,
        Self::ExportLocation,
        Self::GeofenceManage,
        Self::RoutePlanning,
        Self::PlaybackHistory,
        Self::AlertRead,
        Self::AlertManage,
        Self::AlertAcknowledge,
        Self::NotificationSend,
        Self::EmergencyAlert,
        Self::ReportView,
        Self::ReportGenerate,
        Self::ReportSchedule,
        Self::AnalyticsAccess,
        Self::DataExport,
        Self::AuditRead,
        Self::SecurityConfig,
        Self::ComplianceManage,
        Self::BackupRestore,
        Self::ApiAccess,
    ];

    /// Canonical storage form of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::SystemMaintenance => "SYSTEM_MAINTENANCE",
            Self::MultiTenantManage => "MULTI_TENANT_MANAGE",
            Self::SystemConfig => "SYSTEM_CONFIG",
            Self::UserCreate => "USER_CREATE",
            Self::UserRead => "USER_READ",
            Self::UserUpdate => "USER_UPDATE",
            Self::UserDelete => "USER_DELETE",
            Self::UserResetPassword => "USER_RESET_PASSWORD",
            Self::UserActivate => "USER_ACTIVATE",
            Self::RoleCreate => "ROLE_CREATE",
            Self::RoleRead => "ROLE_READ",
            Self::RoleUpdate => "ROLE_UPDATE",
            Self::RoleDelete => "ROLE_DELETE",
            Self::RoleAssign => "ROLE_ASSIGN",
            Self::DeviceRead => "DEVICE_READ",
            Self::DeviceRegister => "DEVICE_REGISTER",
            Self::DeviceUpdate => "DEVICE_UPDATE",
            Self::DeviceDelete => "DEVICE_DELETE",
            Self::DeviceAssign => "DEVICE_ASSIGN",
            Self::DeviceActivate => "DEVICE_ACTIVATE",
            Self::DeviceRemoteConfig => "DEVICE_REMOTE_CONFIG",
            Self::DeviceBulkOperations => "DEVICE_BULK_OPERATIONS",
            Self::VehicleRead => "VEHICLE_READ",
            Self::VehicleCreate => "VEHICLE_CREATE",
            Self::VehicleUpdate => "VEHICLE_UPDATE",
            Self::VehicleDelete => "VEHICLE_DELETE",
            Self::VehicleAssignDevice => "VEHICLE_ASSIGN_DEVICE",
            Self::FleetManage => "FLEET_MANAGE",
            Self::VehicleMaintenance => "VEHICLE_MAINTENANCE",
            Self::ViewLocationLive => "VIEW_LOCATION_LIVE",
            Self::ViewLocationHistory => "VIEW_LOCATION_HISTORY",
            Self::ExportLocation => "EXPORT_LOCATION",
            Self::GeofenceManage => "GEOFENCE_MANAGE",
            Self::RoutePlanning => "ROUTE_PLANNING",
            Self::PlaybackHistory => "PLAYBACK_HISTORY",
            Self::AlertRead => "ALERT_READ",
            Self::AlertManage => "ALERT_MANAGE",
            Self::AlertAcknowledge => "ALERT_ACKNOWLEDGE",
            Self::NotificationSend => "NOTIFICATION_SEND",
            Self::EmergencyAlert => "EMERGENCY_ALERT",
            Self::ReportView => "REPORT_VIEW",
            Self::ReportGenerate => "REPORT_GENERATE",
            Self::ReportSchedule => "REPORT_SCHEDULE",
            Self::AnalyticsAccess => "ANALYTICS_ACCESS",
            Self::DataExport => "DATA_EXPORT",
            Self::AuditRead => "AUDIT_READ",
            Self::SecurityConfig => "SECURITY_CONFIG",
            Self::ComplianceManage => "COMPLIANCE_MANAGE",
            Self::BackupRestore => "BACKUP_RESTORE",
            Self::ApiAccess => "API_ACCESS",
        }
    }

    /// Parse the canonical storage form. Unknown codes yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Whether this is the administrative bypass sentinel.
    pub fn is_super_admin(self) -> bool {
        self == Self::SuperAdmin
    }
}

impl std::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub code: PermissionCode,
    pub name: String,
    pub description: String,
    pub category: PermissionCategory,
    pub active: bool,
    /// Whether possession must additionally be validated against a
    /// scope id (typically the caller's tenant) at check time.
    pub requires_scope: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub code: PermissionCode,
    pub name: String,
    pub description: String,
    pub category: PermissionCategory,
    pub requires_scope: bool,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePermission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub requires_scope: Option<bool>,
}
