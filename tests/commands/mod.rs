mod test_broadcast;
mod test_templates;
