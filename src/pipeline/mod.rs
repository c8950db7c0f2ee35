// Store-level analysis runs — one call per dashboard view.
//
// Each function takes one store's reviews, checks that view's preconditions
// and returns a finished result ready for display or export. The CLI
// commands and the interactive session both go through here.

pub mod store;
