//! [`BookingStore`] backed by `PostgreSQL`.

use chrono::NaiveDate;
use sqlx::PgPool;

use royal_barber_core::schedule::{
    Appointment, Barber, BarberProfile, Service, ServiceProfile, ShopConfig,
};
use royal_barber_core::types::{AppointmentId, AppointmentStatus, BarberId, ServiceId};

use super::{
    AppointmentDraft, AppointmentFilter, AppointmentRepository, BarberRepository, BookingStore,
    RepositoryError, ServiceRepository, ShopConfigRepository,
};

/// `PostgreSQL` store; each call borrows the pool through a per-table repository.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BookingStore for PgStore {
    async fn list_barbers(&self) -> Result<Vec<Barber>, RepositoryError> {
        BarberRepository::new(&self.pool).list_all().await
    }

    async fn get_barber(&self, id: BarberId) -> Result<Option<Barber>, RepositoryError> {
        BarberRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_barber(&self, profile: &BarberProfile) -> Result<Barber, RepositoryError> {
        BarberRepository::new(&self.pool).create(profile).await
    }

    async fn update_barber(
        &self,
        id: BarberId,
        profile: &BarberProfile,
    ) -> Result<Option<Barber>, RepositoryError> {
        BarberRepository::new(&self.pool).update(id, profile).await
    }

    async fn delete_barber(&self, id: BarberId) -> Result<bool, RepositoryError> {
        BarberRepository::new(&self.pool).delete(id).await
    }

    async fn list_services(&self) -> Result<Vec<Service>, RepositoryError> {
        ServiceRepository::new(&self.pool).list_all().await
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        ServiceRepository::new(&self.pool).get_by_id(id).await
    }

    async fn create_service(&self, profile: &ServiceProfile) -> Result<Service, RepositoryError> {
        ServiceRepository::new(&self.pool).create(profile).await
    }

    async fn update_service(
        &self,
        id: ServiceId,
        profile: &ServiceProfile,
    ) -> Result<Option<Service>, RepositoryError> {
        ServiceRepository::new(&self.pool).update(id, profile).await
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool, RepositoryError> {
        ServiceRepository::new(&self.pool).delete(id).await
    }

    async fn shop_config(&self) -> Result<ShopConfig, RepositoryError> {
        ShopConfigRepository::new(&self.pool).get().await
    }

    async fn save_shop_config(&self, config: &ShopConfig) -> Result<(), RepositoryError> {
        ShopConfigRepository::new(&self.pool).save(config).await
    }

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, RepositoryError> {
        AppointmentRepository::new(&self.pool).get_by_id(id).await
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        AppointmentRepository::new(&self.pool).list(filter).await
    }

    async fn appointments_for(
        &self,
        barber: BarberId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        AppointmentRepository::new(&self.pool)
            .for_barber_on(barber, date)
            .await
    }

    async fn insert_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> Result<Appointment, RepositoryError> {
        AppointmentRepository::new(&self.pool).insert(draft).await
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        expected: AppointmentStatus,
        draft: &AppointmentDraft,
    ) -> Result<Option<Appointment>, RepositoryError> {
        AppointmentRepository::new(&self.pool)
            .update(id, expected, draft)
            .await
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, RepositoryError> {
        AppointmentRepository::new(&self.pool)
            .update_status(id, from, to)
            .await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
