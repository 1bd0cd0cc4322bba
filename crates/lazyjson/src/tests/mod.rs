mod arbitrary;
mod property_edits;
