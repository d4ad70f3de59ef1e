//! Trait comuni dei repository
//!
//! Interfacce generiche per le letture sul database condiviso; le scritture
//! vivono come funzioni associate su `&mut MySqlConnection`, dentro una transazione.
//! Le chiavi primarie sono stringhe uuid (utenti, organizzazioni, corsi),
//! interi auto-increment (feedback, punteggi) o stringhe libere (impostazioni).

/// Lettura di una singola entità per chiave primaria
pub trait Read<Entity, Id: ?Sized> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Entità trovata
    /// * `Ok(None)` - Nessuna entità con quella chiave
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Cancellazione per chiave primaria
pub trait Delete<Id: ?Sized> {
    /// # Returns
    /// * `Ok(true)` - Riga cancellata
    /// * `Ok(false)` - Nessuna riga con quella chiave
    async fn delete(&self, id: &Id) -> Result<bool, sqlx::Error>;
}

/// Conteggio delle righe della tabella, usato dalle card della dashboard
pub trait Count {
    async fn count(&self) -> Result<i64, sqlx::Error>;
}
