//! External collaborator interface contracts named in §6: tariff YAML and
//! usage CSV parsing. Deliberately thin and isolated from the core so the
//! core stays a pure function of in-memory values (§1 out-of-scope list).

pub mod tariff_yaml;
pub mod usage_csv;
