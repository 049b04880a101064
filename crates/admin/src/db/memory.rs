//! In-memory [`BookingStore`].
//!
//! All data sits behind one mutex, so the overlap check and the write of an
//! appointment happen atomically. Referential rules mirror the database: a
//! barber or service still referenced cannot be deleted.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};

use royal_barber_core::schedule::{
    Appointment, Barber, BarberProfile, Service, ServiceProfile, ShopConfig,
};
use royal_barber_core::types::{AppointmentId, AppointmentStatus, BarberId, ServiceId};

use super::{AppointmentDraft, AppointmentFilter, BookingStore, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    barbers: BTreeMap<BarberId, Barber>,
    services: BTreeMap<ServiceId, Service>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    config: Option<ShopConfig>,
    // One sequence per table; ids are never reused after a delete.
    barber_seq: i32,
    service_seq: i32,
    appointment_seq: i32,
}

fn next_id(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

impl Tables {
    fn ensure_free(
        &self,
        draft: &AppointmentDraft,
        exclude: Option<AppointmentId>,
    ) -> Result<(), RepositoryError> {
        let interval = draft.interval();
        let clash = self.appointments.values().find(|appointment| {
            Some(appointment.id) != exclude
                && appointment.occupies(draft.barber_id, draft.date)
                && appointment.interval().overlaps(&interval)
        });
        match clash {
            Some(appointment) => Err(RepositoryError::Conflict(format!(
                "overlaps appointment {}",
                appointment.id
            ))),
            None => Ok(()),
        }
    }

    fn ensure_barber_exists(&self, id: Option<BarberId>) -> Result<(), RepositoryError> {
        match id {
            Some(id) if !self.barbers.contains_key(&id) => Err(RepositoryError::Conflict(
                format!("barber {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }
}

/// Store that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// An empty store with no shop configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store with the given shop configuration.
    #[must_use]
    pub fn with_config(config: ShopConfig) -> Self {
        let store = Self::default();
        store.lock().config = Some(config);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookingStore for MemoryStore {
    async fn list_barbers(&self) -> Result<Vec<Barber>, RepositoryError> {
        Ok(self.lock().barbers.values().cloned().collect())
    }

    async fn get_barber(&self, id: BarberId) -> Result<Option<Barber>, RepositoryError> {
        Ok(self.lock().barbers.get(&id).cloned())
    }

    async fn create_barber(&self, profile: &BarberProfile) -> Result<Barber, RepositoryError> {
        let mut tables = self.lock();
        let id = BarberId::new(next_id(&mut tables.barber_seq));
        let barber = profile.clone().into_barber(id);
        tables.barbers.insert(barber.id, barber.clone());
        Ok(barber)
    }

    async fn update_barber(
        &self,
        id: BarberId,
        profile: &BarberProfile,
    ) -> Result<Option<Barber>, RepositoryError> {
        let mut tables = self.lock();
        Ok(tables.barbers.get_mut(&id).map(|barber| {
            *barber = profile.clone().into_barber(id);
            barber.clone()
        }))
    }

    async fn delete_barber(&self, id: BarberId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock();
        let referenced = tables.appointments.values().any(|a| a.barber_id == id)
            || tables.services.values().any(|s| s.barber_id == Some(id));
        if referenced {
            return Err(RepositoryError::Conflict(format!(
                "barber {id} is still referenced"
            )));
        }
        Ok(tables.barbers.remove(&id).is_some())
    }

    async fn list_services(&self) -> Result<Vec<Service>, RepositoryError> {
        Ok(self.lock().services.values().cloned().collect())
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        Ok(self.lock().services.get(&id).cloned())
    }

    async fn create_service(&self, profile: &ServiceProfile) -> Result<Service, RepositoryError> {
        let mut tables = self.lock();
        tables.ensure_barber_exists(profile.barber_id)?;
        let id = ServiceId::new(next_id(&mut tables.service_seq));
        let service = profile.clone().into_service(id);
        tables.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: ServiceId,
        profile: &ServiceProfile,
    ) -> Result<Option<Service>, RepositoryError> {
        let mut tables = self.lock();
        tables.ensure_barber_exists(profile.barber_id)?;
        Ok(tables.services.get_mut(&id).map(|service| {
            *service = profile.clone().into_service(id);
            service.clone()
        }))
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock();
        if tables.appointments.values().any(|a| a.service_id == id) {
            return Err(RepositoryError::Conflict(format!(
                "service {id} is still referenced"
            )));
        }
        Ok(tables.services.remove(&id).is_some())
    }

    async fn shop_config(&self) -> Result<ShopConfig, RepositoryError> {
        self.lock().config.clone().ok_or(RepositoryError::NotFound)
    }

    async fn save_shop_config(&self, config: &ShopConfig) -> Result<(), RepositoryError> {
        self.lock().config = Some(config.clone());
        Ok(())
    }

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.lock().appointments.get(&id).cloned())
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut found: Vec<Appointment> = self
            .lock()
            .appointments
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(found)
    }

    async fn appointments_for(
        &self,
        barber: BarberId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut found: Vec<Appointment> = self
            .lock()
            .appointments
            .values()
            .filter(|appointment| appointment.barber_id == barber && appointment.date == date)
            .cloned()
            .collect();
        found.sort_by_key(|appointment| (appointment.time, appointment.id));
        Ok(found)
    }

    async fn insert_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, RepositoryError> {
        let mut tables = self.lock();
        tables.ensure_free(draft, None)?;

        let now = Utc::now();
        let appointment = Appointment {
            id: AppointmentId::new(next_id(&mut tables.appointment_seq)),
            client_name: draft.client_name.clone(),
            client_phone: draft.client_phone.clone(),
            service_id: draft.service_id,
            barber_id: draft.barber_id,
            date: draft.date,
            time: draft.time,
            duration_minutes: draft.duration_minutes,
            status: draft.status,
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        expected: AppointmentStatus,
        draft: &AppointmentDraft,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let mut tables = self.lock();
        tables.ensure_free(draft, Some(id))?;

        let Some(appointment) = tables
            .appointments
            .get_mut(&id)
            .filter(|appointment| appointment.status == expected)
        else {
            return Ok(None);
        };
        appointment.client_name.clone_from(&draft.client_name);
        appointment.client_phone = draft.client_phone.clone();
        appointment.service_id = draft.service_id;
        appointment.barber_id = draft.barber_id;
        appointment.date = draft.date;
        appointment.time = draft.time;
        appointment.duration_minutes = draft.duration_minutes;
        appointment.status = draft.status;
        appointment.notes.clone_from(&draft.notes);
        appointment.updated_at = Utc::now();
        Ok(Some(appointment.clone()))
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let mut tables = self.lock();
        Ok(tables
            .appointments
            .get_mut(&id)
            .filter(|appointment| appointment.status == from)
            .map(|appointment| {
                appointment.status = to;
                appointment.updated_at = Utc::now();
                appointment.clone()
            }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
