use super::{client_type::ClientType, coordinates::Coordinates, intervention_type::InterventionType};
use chrono::Local;
use serde::Serialize;

/// A client's landscaping site under recurring service.
#[derive(Debug, Clone, Serialize)]
pub struct JobSite {
    pub id: i64,
    pub client_name: String,      // ⇔ job_sites.client_name
    pub client_type: ClientType,  // ⇔ job_sites.client_type ('R' | 'P')
    pub address: String,          // ⇔ job_sites.address
    pub latitude: Option<f64>,    // ⇔ job_sites.latitude (NULL when not geocoded)
    pub longitude: Option<f64>,   // ⇔ job_sites.longitude
    pub mow_enabled: bool,        // ⇔ job_sites.mow_enabled
    pub trim_enabled: bool,       // ⇔ job_sites.trim_enabled
    pub weed_enabled: bool,       // ⇔ job_sites.weed_enabled
    pub notes: String,            // ⇔ job_sites.notes (TEXT, default '')
    pub created_at: String,       // ⇔ job_sites.created_at (ISO8601)
}

impl JobSite {
    /// New, not yet persisted site (`id = 0`) with every service active.
    pub fn new(client_name: &str, client_type: ClientType, address: &str) -> Self {
        Self {
            id: 0,
            client_name: client_name.trim().to_string(),
            client_type,
            address: address.trim().to_string(),
            latitude: None,
            longitude: None,
            mow_enabled: true,
            trim_enabled: true,
            weed_enabled: true,
            notes: String::new(),
            created_at: Local::now().to_rfc3339(),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_columns(self.latitude, self.longitude)
    }

    pub fn set_coordinates(&mut self, coords: Option<Coordinates>) {
        self.latitude = coords.map(|c| c.latitude);
        self.longitude = coords.map(|c| c.longitude);
    }

    pub fn is_active(&self, kind: InterventionType) -> bool {
        match kind {
            InterventionType::Mow => self.mow_enabled,
            InterventionType::Trim => self.trim_enabled,
            InterventionType::Weed => self.weed_enabled,
        }
    }

    pub fn set_active(&mut self, kind: InterventionType, active: bool) {
        match kind {
            InterventionType::Mow => self.mow_enabled = active,
            InterventionType::Trim => self.trim_enabled = active,
            InterventionType::Weed => self.weed_enabled = active,
        }
    }

    /// Replace the active services with exactly the given set.
    pub fn set_services(&mut self, services: &[InterventionType]) {
        for kind in InterventionType::ALL {
            self.set_active(kind, services.contains(&kind));
        }
    }

    pub fn active_services(&self) -> Vec<InterventionType> {
        InterventionType::ALL
            .into_iter()
            .filter(|k| self.is_active(*k))
            .collect()
    }

    pub fn services_label(&self) -> String {
        let active = self.active_services();
        if active.is_empty() {
            return "-".to_string();
        }
        active
            .iter()
            .map(|k| k.to_db_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
