//! Built-in permission catalog and role hierarchy.
//!
//! The platform ships a fixed catalog of permissions and six built-in
//! roles ordered by increasing authority: VIEWER, INSTALLER,
//! DISPATCHER, FLEET_MANAGER, TENANT_ADMIN, SUPER_ADMIN. SUPER_ADMIN
//! is the only scope-exempt permission and the only Global-scoped
//! built-in role; every other grant is validated against the caller's
//! tenant. Seeding into the directory happens in the db crate.

use crate::models::permission::{PermissionCategory, PermissionCode};
use crate::models::role::RoleScope;

/// Catalog entry for one built-in permission.
#[derive(Debug, Clone, Copy)]
pub struct PermissionDefinition {
    pub code: PermissionCode,
    pub name: &'static str,
    pub description: &'static str,
    pub category: PermissionCategory,
    pub requires_scope: bool,
}

const fn def(
    code: PermissionCode,
    name: &'static str,
    description: &'static str,
    category: PermissionCategory,
    requires_scope: bool,
) -> PermissionDefinition {
    PermissionDefinition {
        code,
        name,
        description,
        category,
        requires_scope,
    }
}

use crate::models::permission::PermissionCategory as Cat;
use crate::models::permission::PermissionCode as P;

pub static BUILTIN_PERMISSIONS: &[PermissionDefinition] = &[
    // System administration. SUPER_ADMIN is the only scope-exempt code.
    def(
        P::SuperAdmin,
        "Super Administrator Access",
        "Complete system access with all permissions",
        Cat::SystemAdministration,
        false,
    ),
    def(
        P::SystemMaintenance,
        "System Maintenance",
        "Core system operations and maintenance tasks",
        Cat::SystemAdministration,
        true,
    ),
    def(
        P::MultiTenantManage,
        "Multi-Tenant Management",
        "Cross-tenant operations and global management",
        Cat::SystemAdministration,
        true,
    ),
    def(
        P::SystemConfig,
        "System Configuration",
        "Modify global system settings and parameters",
        Cat::SystemAdministration,
        true,
    ),
    // User management
    def(
        P::UserCreate,
        "Create User",
        "Create new user accounts",
        Cat::UserManagement,
        true,
    ),
    def(
        P::UserRead,
        "View Users",
        "View user information and profiles",
        Cat::UserManagement,
        true,
    ),
    def(
        P::UserUpdate,
        "Update User",
        "Modify user information and settings",
        Cat::UserManagement,
        true,
    ),
    def(
        P::UserDelete,
        "Delete User",
        "Remove user accounts from system",
        Cat::UserManagement,
        true,
    ),
    def(
        P::UserResetPassword,
        "Reset Password",
        "Reset user passwords",
        Cat::UserManagement,
        true,
    ),
    def(
        P::UserActivate,
        "Activate/Deactivate Users",
        "Enable or disable user accounts",
        Cat::UserManagement,
        true,
    ),
    // Role management
    def(
        P::RoleCreate,
        "Create Role",
        "Create new roles and permissions",
        Cat::RoleManagement,
        true,
    ),
    def(
        P::RoleRead,
        "View Roles",
        "View role definitions and permissions",
        Cat::RoleManagement,
        true,
    ),
    def(
        P::RoleUpdate,
        "Update Role",
        "Modify role permissions and settings",
        Cat::RoleManagement,
        true,
    ),
    def(
        P::RoleDelete,
        "Delete Role",
        "Remove roles from system",
        Cat::RoleManagement,
        true,
    ),
    def(
        P::RoleAssign,
        "Assign Roles",
        "Assign roles to users",
        Cat::RoleManagement,
        true,
    ),
    // Device management
    def(
        P::DeviceRead,
        "View Devices",
        "View device information and status",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceRegister,
        "Register Device",
        "Add new tracking devices",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceUpdate,
        "Update Device",
        "Modify device settings and configuration",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceDelete,
        "Delete Device",
        "Remove devices from system",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceAssign,
        "Assign Device",
        "Assign devices to vehicles or users",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceActivate,
        "Activate Device",
        "Enable or disable device functionality",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceRemoteConfig,
        "Remote Configuration",
        "Push configuration updates to devices",
        Cat::DeviceManagement,
        true,
    ),
    def(
        P::DeviceBulkOperations,
        "Bulk Device Operations",
        "Perform mass operations on multiple devices",
        Cat::DeviceManagement,
        true,
    ),
    // Vehicle management
    def(
        P::VehicleRead,
        "View Vehicles",
        "View vehicle details and information",
        Cat::VehicleManagement,
        true,
    ),
    def(
        P::VehicleCreate,
        "Create Vehicle",
        "Add new vehicles to fleet",
        Cat::VehicleManagement,
        true,
    ),
    def(
        P::VehicleUpdate,
        "Update Vehicle",
        "Modify vehicle information and settings",
        Cat::VehicleManagement,
        true,
    ),
    def(
        P::VehicleDelete,
        "Delete Vehicle",
        "Remove vehicles from fleet",
        Cat::VehicleManagement,
        true,
    ),
    def(
        P::VehicleAssignDevice,
        "Assign Device to Vehicle",
        "Connect tracking devices to vehicles",
        Cat::VehicleManagement,
        true,
    ),
    def(
        P::FleetManage,
        "Fleet Management",
        "Organize and manage vehicle groups",
        Cat::VehicleManagement,
        true,
    ),
    def(
        P::VehicleMaintenance,
        "Vehicle Maintenance",
        "Track and schedule vehicle maintenance",
        Cat::VehicleManagement,
        true,
    ),
    // Location tracking
    def(
        P::ViewLocationLive,
        "Live Location Tracking",
        "View real-time vehicle locations",
        Cat::LocationTracking,
        true,
    ),
    def(
        P::ViewLocationHistory,
        "Location History",
        "Access historical tracking data",
        Cat::LocationTracking,
        true,
    ),
    def(
        P::ExportLocation,
        "Export Location Data",
        "Download and export location information",
        Cat::LocationTracking,
        true,
    ),
    def(
        P::GeofenceManage,
        "Geofence Management",
        "Create and manage geographic boundaries",
        Cat::LocationTracking,
        true,
    ),
    def(
        P::RoutePlanning,
        "Route Planning",
        "Create and optimize vehicle routes",
        Cat::LocationTracking,
        true,
    ),
    def(
        P::PlaybackHistory,
        "Route Playback",
        "Replay historical vehicle movements",
        Cat::LocationTracking,
        true,
    ),
    // Alerts & notifications
    def(
        P::AlertRead,
        "View Alerts",
        "View system alerts and notifications",
        Cat::AlertsNotifications,
        true,
    ),
    def(
        P::AlertManage,
        "Manage Alerts",
        "Create and modify alert rules",
        Cat::AlertsNotifications,
        true,
    ),
    def(
        P::AlertAcknowledge,
        "Acknowledge Alerts",
        "Mark alerts as acknowledged",
        Cat::AlertsNotifications,
        true,
    ),
    def(
        P::NotificationSend,
        "Send Notifications",
        "Send messages and notifications",
        Cat::AlertsNotifications,
        true,
    ),
    def(
        P::EmergencyAlert,
        "Emergency Alerts",
        "Handle emergency situations and panic buttons",
        Cat::AlertsNotifications,
        true,
    ),
    // Reports & analytics
    def(
        P::ReportView,
        "View Reports",
        "Access standard system reports",
        Cat::ReportsAnalytics,
        true,
    ),
    def(
        P::ReportGenerate,
        "Generate Reports",
        "Create custom reports and analytics",
        Cat::ReportsAnalytics,
        true,
    ),
    def(
        P::ReportSchedule,
        "Schedule Reports",
        "Set up automated report generation",
        Cat::ReportsAnalytics,
        true,
    ),
    def(
        P::AnalyticsAccess,
        "Analytics Dashboard",
        "Access advanced analytics and KPIs",
        Cat::ReportsAnalytics,
        true,
    ),
    def(
        P::DataExport,
        "Data Export",
        "Export data in various formats",
        Cat::ReportsAnalytics,
        true,
    ),
    // Security & compliance
    def(
        P::AuditRead,
        "View Audit Logs",
        "Access system audit trails",
        Cat::SecurityCompliance,
        true,
    ),
    def(
        P::SecurityConfig,
        "Security Configuration",
        "Modify security settings",
        Cat::SecurityCompliance,
        true,
    ),
    def(
        P::ComplianceManage,
        "Compliance Management",
        "Handle regulatory compliance",
        Cat::SecurityCompliance,
        true,
    ),
    def(
        P::BackupRestore,
        "Backup & Restore",
        "Manage data backup and recovery",
        Cat::SecurityCompliance,
        true,
    ),
    def(
        P::ApiAccess,
        "API Access",
        "Access to system APIs",
        Cat::SecurityCompliance,
        true,
    ),
];

/// Look up the catalog entry for a code.
pub fn definition_for(code: PermissionCode) -> Option<&'static PermissionDefinition> {
    BUILTIN_PERMISSIONS.iter().find(|d| d.code == code)
}

/// Catalog entry for one built-in role.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRole {
    pub name: &'static str,
    pub description: &'static str,
    pub scope: RoleScope,
    pub permissions: &'static [PermissionCode],
}

/// Built-in roles in hierarchy order (least to most privileged).
pub static BUILTIN_ROLES: &[BuiltinRole] = &[
    BuiltinRole {
        name: "VIEWER",
        description: "Read-only access to tracking data and basic reports",
        scope: RoleScope::Tenant,
        permissions: &[
            P::VehicleRead,
            P::ViewLocationLive,
            P::ViewLocationHistory,
            P::AlertRead,
            P::ReportView,
        ],
    },
    BuiltinRole {
        name: "INSTALLER",
        description: "Device Installer with registration and activation permissions",
        scope: RoleScope::Tenant,
        permissions: &[
            P::DeviceRegister,
            P::DeviceAssign,
            P::DeviceActivate,
            P::DeviceUpdate,
            P::VehicleRead,
            P::VehicleAssignDevice,
        ],
    },
    BuiltinRole {
        name: "DISPATCHER",
        description: "Dispatcher with live tracking and communication access",
        scope: RoleScope::Tenant,
        permissions: &[
            P::VehicleRead,
            P::ViewLocationLive,
            P::AlertRead,
            P::AlertAcknowledge,
            P::NotificationSend,
            P::EmergencyAlert,
            P::RoutePlanning,
            P::ReportView,
        ],
    },
    BuiltinRole {
        name: "FLEET_MANAGER",
        description: "Fleet Manager with vehicle and tracking management capabilities",
        scope: RoleScope::Tenant,
        permissions: &[
            P::VehicleRead,
            P::VehicleUpdate,
            P::VehicleAssignDevice,
            P::FleetManage,
            P::VehicleMaintenance,
            P::DeviceRead,
            P::DeviceAssign,
            P::DeviceActivate,
            P::ViewLocationLive,
            P::ViewLocationHistory,
            P::ExportLocation,
            P::GeofenceManage,
            P::RoutePlanning,
            P::PlaybackHistory,
            P::AlertRead,
            P::AlertManage,
            P::AlertAcknowledge,
            P::ReportView,
            P::ReportGenerate,
            P::AnalyticsAccess,
            P::DataExport,
        ],
    },
    BuiltinRole {
        name: "TENANT_ADMIN",
        description: "Tenant Administrator with full access within tenant scope",
        scope: RoleScope::Tenant,
        permissions: &[
            P::UserCreate,
            P::UserRead,
            P::UserUpdate,
            P::UserDelete,
            P::UserResetPassword,
            P::UserActivate,
            P::RoleCreate,
            P::RoleRead,
            P::RoleUpdate,
            P::RoleDelete,
            P::RoleAssign,
            P::DeviceRead,
            P::DeviceRegister,
            P::DeviceUpdate,
            P::DeviceAssign,
            P::DeviceActivate,
            P::DeviceRemoteConfig,
            P::DeviceBulkOperations,
            P::VehicleRead,
            P::VehicleCreate,
            P::VehicleUpdate,
            P::VehicleDelete,
            P::VehicleAssignDevice,
            P::FleetManage,
            P::VehicleMaintenance,
            P::ViewLocationLive,
            P::ViewLocationHistory,
            P::ExportLocation,
            P::GeofenceManage,
            P::RoutePlanning,
            P::PlaybackHistory,
            P::AlertRead,
            P::AlertManage,
            P::AlertAcknowledge,
            P::NotificationSend,
            P::ReportView,
            P::ReportGenerate,
            P::ReportSchedule,
            P::AnalyticsAccess,
            P::DataExport,
            P::AuditRead,
            P::ApiAccess,
        ],
    },
    BuiltinRole {
        name: "SUPER_ADMIN",
        description: "Super Administrator with complete system access across all tenants",
        scope: RoleScope::Global,
        permissions: &P::ALL,
    },
];
