/// List-relative sample path, also used as the sample's stable identifier.
/// Example: `data/model4_session1_sample2`
pub type SampleId = String;
/// Identity of the subject that owns a sample.
/// Examples: `1`, `client_07`
pub type ClientId = String;
/// Enrollment model identifier; distinct from the client identity.
/// Examples: `3`, `m01_session2`
pub type ModelId = String;
/// Name of a protocol subdirectory below the database base directory.
/// Examples: `P1`, `example_fl`
pub type ProtocolName = String;
/// Landmark label used in annotation maps.
/// Examples: `reye`, `leye`, `key1`
pub type AnnotationLabel = String;
/// Raw tokens of one parsed list row (2-4 entries).
/// Example: `["data/s004", "m01", "c01", "c02"]`
pub type ListRow = Vec<String>;
