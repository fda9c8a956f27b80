//! Operator tests kept apart from the implementation files.
