//! SQLite-backed person and mapping store.

use crate::error::{StorageError, StorageResult};
use crate::store::{MappingStore, PersonStore};
use crmsync_types::{ContactId, ContactMapping, ListStatus, Person, PersonId, Preference, TagId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Persistent store for persons and contact mappings backed by SQLite.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("Opened crmsync store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.conn()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS persons (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                sync_disabled INTEGER NOT NULL DEFAULT 0,
                wants_product_newsletter INTEGER,
                wants_company_newsletter INTEGER
            );

            CREATE INDEX IF NOT EXISTS persons_email ON persons (email);

            CREATE TABLE IF NOT EXISTS contact_mappings (
                person_id TEXT NOT NULL UNIQUE,
                contact_id TEXT NOT NULL UNIQUE,
                list_status TEXT NOT NULL,
                tag_ids TEXT NOT NULL,
                deactivated INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;
        Ok(())
    }
}

const PERSON_COLUMNS: &str =
    "id, email, name, sync_disabled, wants_product_newsletter, wants_company_newsletter";

const MAPPING_COLUMNS: &str = "person_id, contact_id, list_status, tag_ids, deactivated";

type PersonRow = (String, String, String, bool, Option<bool>, Option<bool>);

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_person(
    (id, email, name, sync_disabled, product, company): PersonRow,
) -> StorageResult<Person> {
    let id: PersonId = id
        .parse()
        .map_err(|e| StorageError::InvalidData(format!("invalid person id {id}: {e}")))?;
    Ok(Person {
        id,
        email,
        name,
        sync_disabled,
        wants_product_newsletter: Preference::from(product),
        wants_company_newsletter: Preference::from(company),
    })
}

type MappingRow = (String, String, String, String, bool);

fn mapping_from_row(row: &Row<'_>) -> rusqlite::Result<MappingRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_mapping(
    (person_id, contact_id, list_status, tag_ids, deactivated): MappingRow,
) -> StorageResult<ContactMapping> {
    let person_id: PersonId = person_id
        .parse()
        .map_err(|e| StorageError::InvalidData(format!("invalid person id {person_id}: {e}")))?;
    let list_status: ListStatus = list_status
        .parse()
        .map_err(|e| StorageError::InvalidData(format!("{e}")))?;
    let tag_ids: BTreeSet<TagId> = serde_json::from_str(&tag_ids)?;
    Ok(ContactMapping {
        person_id,
        contact_id: ContactId::new(contact_id),
        list_status,
        tag_ids,
        deactivated,
    })
}

impl PersonStore for SqliteStore {
    fn insert_person(&self, person: &Person) -> StorageResult<()> {
        let product: Option<bool> = person.wants_product_newsletter.into();
        let company: Option<bool> = person.wants_company_newsletter.into();
        self.conn()?.execute(
            &format!("INSERT INTO persons ({PERSON_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                person.id.to_string(),
                person.email,
                person.name,
                person.sync_disabled,
                product,
                company,
            ],
        )?;
        Ok(())
    }

    fn get_person(&self, id: &PersonId) -> StorageResult<Option<Person>> {
        let row = self
            .conn()?
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
                params![id.to_string()],
                person_from_row,
            )
            .optional()?;
        row.map(decode_person).transpose()
    }

    fn find_person_by_email(&self, email: &str) -> StorageResult<Option<Person>> {
        let row = self
            .conn()?
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE email = ?1 LIMIT 1"),
                params![email],
                person_from_row,
            )
            .optional()?;
        row.map(decode_person).transpose()
    }

    fn list_persons(&self) -> StorageResult<Vec<Person>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY rowid"))?;
        let rows = stmt.query_map([], person_from_row)?;

        let mut persons = Vec::new();
        for row in rows {
            persons.push(decode_person(row?)?);
        }
        Ok(persons)
    }

    fn fill_unset_preferences(
        &self,
        id: &PersonId,
        product: bool,
        company: bool,
    ) -> StorageResult<()> {
        let changed = self.conn()?.execute(
            "UPDATE persons SET
                wants_product_newsletter = COALESCE(wants_product_newsletter, ?2),
                wants_company_newsletter = COALESCE(wants_company_newsletter, ?3)
             WHERE id = ?1",
            params![id.to_string(), product, company],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("person {id}")));
        }
        Ok(())
    }

    fn set_sync_disabled(&self, id: &PersonId) -> StorageResult<()> {
        let changed = self.conn()?.execute(
            "UPDATE persons SET sync_disabled = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("person {id}")));
        }
        Ok(())
    }
}

impl MappingStore for SqliteStore {
    fn find_mapping_by_person(
        &self,
        person_id: &PersonId,
    ) -> StorageResult<Option<ContactMapping>> {
        let row = self
            .conn()?
            .query_row(
                &format!("SELECT {MAPPING_COLUMNS} FROM contact_mappings WHERE person_id = ?1"),
                params![person_id.to_string()],
                mapping_from_row,
            )
            .optional()?;
        row.map(decode_mapping).transpose()
    }

    fn find_mapping_by_contact(
        &self,
        contact_id: &ContactId,
    ) -> StorageResult<Option<ContactMapping>> {
        let row = self
            .conn()?
            .query_row(
                &format!("SELECT {MAPPING_COLUMNS} FROM contact_mappings WHERE contact_id = ?1"),
                params![contact_id.as_str()],
                mapping_from_row,
            )
            .optional()?;
        row.map(decode_mapping).transpose()
    }

    fn create_mapping(&self, mapping: &ContactMapping) -> StorageResult<()> {
        let tag_ids = serde_json::to_string(&mapping.tag_ids)?;
        self.conn()?.execute(
            &format!("INSERT INTO contact_mappings ({MAPPING_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                mapping.person_id.to_string(),
                mapping.contact_id.as_str(),
                mapping.list_status.as_str(),
                tag_ids,
                mapping.deactivated,
            ],
        )?;
        Ok(())
    }

    fn update_mapping(&self, mapping: &ContactMapping) -> StorageResult<()> {
        let tag_ids = serde_json::to_string(&mapping.tag_ids)?;
        let changed = self.conn()?.execute(
            "UPDATE contact_mappings
             SET contact_id = ?2, list_status = ?3, tag_ids = ?4, deactivated = ?5
             WHERE person_id = ?1",
            params![
                mapping.person_id.to_string(),
                mapping.contact_id.as_str(),
                mapping.list_status.as_str(),
                tag_ids,
                mapping.deactivated,
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("mapping for {mapping}")));
        }
        Ok(())
    }

    fn delete_mapping_by_contact(&self, contact_id: &ContactId) -> StorageResult<usize> {
        let deleted = self.conn()?.execute(
            "DELETE FROM contact_mappings WHERE contact_id = ?1",
            params![contact_id.as_str()],
        )?;
        Ok(deleted)
    }
}
