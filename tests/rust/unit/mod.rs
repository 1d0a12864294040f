//! Unit tests - rendering rules for mldb.log() arguments, no server needed
