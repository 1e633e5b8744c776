pub mod table_list;
